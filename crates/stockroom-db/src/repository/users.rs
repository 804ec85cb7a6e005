//! User operations

use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;
use crate::utils::now_rfc3339;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Emails are unique; a second registration with the same address fails
    /// with [`DbError::Duplicate`].
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let (now, now_str) = now_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO users (created_at, updated_at, full_name, email, password)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&now_str)
        .bind(&now_str)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DbError::Duplicate(format!("User with email '{}' already exists", user.email))
            }
            other => DbError::Query(other),
        })?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, full_name, email, password, created_at, updated_at
            FROM users
            WHERE email = ? AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }
}
