//! Item operations
//!
//! Every lookup, update and delete takes an `owner` argument. `Some(user_id)`
//! adds `user_id = ?` to the same predicate as the row id, so a row owned by
//! somebody else is indistinguishable from a missing one. `None` leaves the
//! query unscoped, which is only used when authentication is disabled.

use sqlx::Row;

use crate::error::DbError;
use crate::models::{Item, NewItem};
use crate::repository::Database;
use crate::utils::now_rfc3339;

/// Item columns plus owner details from a `LEFT JOIN users u`
const ITEM_WITH_OWNER_COLUMNS: &str = r#"
    i.id, i.name, i.qty, i.user_id, i.created_at, i.updated_at,
    u.id AS owner_id, u.full_name AS owner_full_name, u.email AS owner_email
"#;

impl Database {
    // ==================== Item Operations ====================

    /// Insert a new item
    pub async fn insert_item(&self, item: NewItem) -> Result<Item, DbError> {
        let (now, now_str) = now_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO items (created_at, updated_at, name, qty, user_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&now_str)
        .bind(&now_str)
        .bind(&item.name)
        .bind(item.qty)
        .bind(item.user_id)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Item {
            id,
            name: item.name,
            qty: item.qty,
            user_id: item.user_id,
            created_at: now,
            updated_at: now,
            user: None,
        })
    }

    /// List live items with owner details attached
    pub async fn list_items(&self, owner: Option<i64>) -> Result<Vec<Item>, DbError> {
        let sql = format!(
            r#"
            SELECT {ITEM_WITH_OWNER_COLUMNS}
            FROM items i
            LEFT JOIN users u ON u.id = i.user_id AND u.deleted_at IS NULL
            WHERE i.deleted_at IS NULL AND (? IS NULL OR i.user_id = ?)
            ORDER BY i.id
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(owner)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Item::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Find live items whose name contains `name` (case-sensitive)
    pub async fn search_items(&self, name: &str, owner: Option<i64>) -> Result<Vec<Item>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, qty, user_id, created_at, updated_at
            FROM items
            WHERE deleted_at IS NULL
              AND instr(name, ?) > 0
              AND (? IS NULL OR user_id = ?)
            ORDER BY id
            "#,
        )
        .bind(name)
        .bind(owner)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Item::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get a live item by ID with owner details attached
    pub async fn get_item(&self, id: i64, owner: Option<i64>) -> Result<Option<Item>, DbError> {
        let sql = format!(
            r#"
            SELECT {ITEM_WITH_OWNER_COLUMNS}
            FROM items i
            LEFT JOIN users u ON u.id = i.user_id AND u.deleted_at IS NULL
            WHERE i.id = ? AND i.deleted_at IS NULL AND (? IS NULL OR i.user_id = ?)
            "#
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Item::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Replace every mutable column of an existing item
    ///
    /// Returns the saved item, or `None` when no live row with that ID
    /// exists anymore.
    pub async fn save_item(&self, item: Item) -> Result<Option<Item>, DbError> {
        let (now, now_str) = now_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = ?, qty = ?, user_id = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&item.name)
        .bind(item.qty)
        .bind(item.user_id)
        .bind(&now_str)
        .bind(item.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Item {
            updated_at: now,
            ..item
        }))
    }

    /// Soft-delete an item
    pub async fn delete_item(&self, id: i64, owner: Option<i64>) -> Result<bool, DbError> {
        let (_, now_str) = now_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE items
            SET deleted_at = ?
            WHERE id = ? AND deleted_at IS NULL AND (? IS NULL OR user_id = ?)
            "#,
        )
        .bind(&now_str)
        .bind(id)
        .bind(owner)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
