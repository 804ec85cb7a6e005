//! Router harness shared by the route tests

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use stockroom_auth::JwtManager;
use stockroom_db::Database;
use tower::ServiceExt;

use crate::routes::create_router;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret-key";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Auth enabled, name search unscoped
    pub async fn new() -> Self {
        Self::with_options(true, false).await
    }

    pub async fn with_options(auth_enabled: bool, scoped_search: bool) -> Self {
        let db = Database::in_memory().await.unwrap();
        let jwt = Arc::new(JwtManager::new(TEST_SECRET, None));
        let state = AppState::new(db, jwt, auth_enabled, scoped_search);
        let router = create_router(state.clone(), None);
        Self { state, router }
    }

    /// Send a request with an optional bearer token and JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    /// Send a fully built request and decode the JSON envelope
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Register an account and return its id
    pub async fn register(&self, email: &str, password: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/register",
                None,
                Some(json!({"full_name": "Test User", "email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    /// Log in and return the token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"].as_str().unwrap().to_string()
    }

    /// Register and log in a fresh account
    pub async fn user(&self, email: &str) -> (i64, String) {
        let id = self.register(email, "password123").await;
        let token = self.login(email, "password123").await;
        (id, token)
    }

    /// Create an item and return the response data
    pub async fn create_item(&self, token: &str, name: &str, qty: i64) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/items",
                Some(token),
                Some(json!({"name": name, "qty": qty})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body["data"].clone()
    }
}
