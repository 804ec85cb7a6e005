//! Item routes
//!
//! Every handler takes [`RequireAuth`], so with authentication enabled the
//! caller's id is always part of the store predicate.

use axum::{
    Router,
    extract::State,
    routing::get,
};
use stockroom_db::{Item, NewItem};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::response::ApiResponse;
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{ItemPayload, ListItemsQuery};

/// POST /items
async fn create_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> Result<ApiResponse<Item>, ApiError> {
    let item = state
        .db
        .insert_item(NewItem {
            name: payload.name,
            qty: payload.qty,
            user_id: auth.owner(),
        })
        .await
        .map_err(|e| {
            warn!("Failed to create item: {}", e);
            ApiError::BadRequest(e.to_string())
        })?;

    metrics::counter!("stockroom_item_mutations_total", "op" => "create").increment(1);
    info!("Created item {} for owner {:?}", item.id, item.user_id);

    Ok(ApiResponse::success(item))
}

/// GET /items
///
/// A `name` filter searches all owners unless `items.scoped_search` is on.
async fn list_items(
    auth: RequireAuth,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListItemsQuery>,
) -> Result<ApiResponse<Vec<Item>>, ApiError> {
    let Some(name) = query.name_filter() else {
        let items = state.db.list_items(auth.owner()).await?;
        return Ok(ApiResponse::success(items));
    };

    let owner = if state.scoped_search { auth.owner() } else { None };
    debug!("Searching items by name {:?} (owner {:?})", name, owner);

    let items = state.db.search_items(name, owner).await?;
    if items.is_empty() {
        return Ok(ApiResponse::with_message(
            items,
            format!("Items with name {} not found", name),
        ));
    }

    Ok(ApiResponse::success(items))
}

/// GET /items/{id}
async fn get_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse<Item>, ApiError> {
    let item = state
        .db
        .get_item(id, auth.owner())
        .await?
        .ok_or_else(|| ApiError::item_not_found(id))?;

    Ok(ApiResponse::success(item))
}

/// PUT /items/{id}
async fn update_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> Result<ApiResponse<Item>, ApiError> {
    if payload.name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }

    let existing = state
        .db
        .get_item(id, auth.owner())
        .await?
        .ok_or_else(|| ApiError::item_not_found(id))?;

    // Identity and ownership always come from the stored row
    let replacement = Item {
        id: existing.id,
        user_id: existing.user_id,
        created_at: existing.created_at,
        updated_at: existing.updated_at,
        name: payload.name,
        qty: payload.qty,
        user: None,
    };

    let saved = state
        .db
        .save_item(replacement)
        .await?
        .ok_or_else(|| ApiError::item_not_found(id))?;

    metrics::counter!("stockroom_item_mutations_total", "op" => "update").increment(1);
    info!("Updated item {}", saved.id);

    Ok(ApiResponse::success(saved))
}

/// DELETE /items/{id}
async fn delete_item(
    auth: RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse<()>, ApiError> {
    if !state.db.delete_item(id, auth.owner()).await? {
        return Err(ApiError::item_not_found(id));
    }

    metrics::counter!("stockroom_item_mutations_total", "op" => "delete").increment(1);
    info!("Deleted item {}", id);

    Ok(ApiResponse::success(()))
}

/// Create item routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::{Value, json};
    use stockroom_auth::Claims;

    use crate::test_support::{TEST_SECRET, TestApp};

    fn ids(items: &Value) -> Vec<i64> {
        items
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_create_forces_owner_from_token() {
        let app = TestApp::new().await;
        let (alice, token) = app.user("alice@example.com").await;
        let (bob, _) = app.user("bob@example.com").await;

        let (status, body) = app
            .request(
                "POST",
                "/items",
                Some(&token),
                Some(json!({"name": "Shampoo", "qty": 15, "user_id": bob})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Shampoo");
        assert_eq!(body["data"]["qty"], 15);
        assert_eq!(body["data"]["user_id"], alice);
    }

    #[tokio::test]
    async fn test_create_accepts_negative_quantity() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;

        let item = app.create_item(&token, "Backorder", -4).await;
        assert_eq!(item["qty"], -4);
    }

    #[tokio::test]
    async fn test_create_malformed_body() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;

        let (status, body) = app
            .request(
                "POST",
                "/items",
                Some(&token),
                Some(json!({"name": "Shampoo", "qty": "lots"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_create_for_unknown_user_is_bad_request() {
        let app = TestApp::new().await;
        // Valid signature, but no such account
        let token = app.state.jwt.generate_token(999).unwrap();

        let (status, body) = app
            .request("POST", "/items", Some(&token), Some(json!({"name": "Ghost", "qty": 1})))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_list_returns_only_own_items_with_owner() {
        let app = TestApp::new().await;
        let (alice, alice_token) = app.user("alice@example.com").await;
        let (_, bob_token) = app.user("bob@example.com").await;

        let first = app.create_item(&alice_token, "Shampoo", 15).await;
        let second = app.create_item(&alice_token, "Soap", 3).await;
        app.create_item(&bob_token, "Towel", 2).await;

        let (status, body) = app.request("GET", "/items", Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            ids(&body["data"]),
            vec![first["id"].as_i64().unwrap(), second["id"].as_i64().unwrap()]
        );
        for item in body["data"].as_array().unwrap() {
            assert_eq!(item["user_id"], alice);
            assert_eq!(item["user"]["id"], alice);
            assert_eq!(item["user"]["email"], "alice@example.com");
            assert!(item["user"].get("password").is_none());
        }

        let (_, body) = app.request("GET", "/items", Some(&bob_token), None).await;
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Towel"]);
    }

    #[tokio::test]
    async fn test_list_for_new_user_is_empty_array() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;

        let (status, body) = app.request("GET", "/items", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "", "data": []}));
    }

    #[tokio::test]
    async fn test_name_search_spans_all_owners() {
        // Known inconsistency: the name filter ignores ownership unless
        // `items.scoped_search` is enabled
        let app = TestApp::new().await;
        let (_, alice_token) = app.user("alice@example.com").await;
        let (_, bob_token) = app.user("bob@example.com").await;

        let shampoo = app.create_item(&alice_token, "Shampoo", 15).await;
        app.create_item(&alice_token, "shampoo travel size", 1).await;
        app.create_item(&alice_token, "Soap", 3).await;

        let (status, body) = app
            .request("GET", "/items?name=Sham", Some(&bob_token), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "");
        assert_eq!(ids(&body["data"]), vec![shampoo["id"].as_i64().unwrap()]);
    }

    #[tokio::test]
    async fn test_name_search_without_matches() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;
        app.create_item(&token, "Shampoo", 15).await;

        let (status, body) = app
            .request("GET", "/items?name=Towel", Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "message": "Items with name Towel not found", "data": []})
        );
    }

    #[tokio::test]
    async fn test_empty_name_filter_is_ignored() {
        let app = TestApp::new().await;
        let (_, alice_token) = app.user("alice@example.com").await;
        let (_, bob_token) = app.user("bob@example.com").await;
        app.create_item(&alice_token, "Shampoo", 15).await;

        let (_, body) = app.request("GET", "/items?name=", Some(&bob_token), None).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_scoped_search() {
        let app = TestApp::with_options(true, true).await;
        let (_, alice_token) = app.user("alice@example.com").await;
        let (_, bob_token) = app.user("bob@example.com").await;
        app.create_item(&alice_token, "Shampoo", 15).await;
        let bobs = app.create_item(&bob_token, "Shampoo", 2).await;

        let (_, body) = app
            .request("GET", "/items?name=Sham", Some(&bob_token), None)
            .await;
        assert_eq!(ids(&body["data"]), vec![bobs["id"].as_i64().unwrap()]);
    }

    #[tokio::test]
    async fn test_get_item() {
        let app = TestApp::new().await;
        let (alice, token) = app.user("alice@example.com").await;
        let item = app.create_item(&token, "Shampoo", 15).await;
        let id = item["id"].as_i64().unwrap();

        let (status, body) = app
            .request("GET", &format!("/items/{}", id), Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id);
        assert_eq!(body["data"]["name"], "Shampoo");
        assert_eq!(body["data"]["user"]["id"], alice);
    }

    #[tokio::test]
    async fn test_get_foreign_item_is_not_found() {
        let app = TestApp::new().await;
        let (_, alice_token) = app.user("alice@example.com").await;
        let (_, bob_token) = app.user("bob@example.com").await;
        let item = app.create_item(&alice_token, "Shampoo", 15).await;
        let id = item["id"].as_i64().unwrap();

        let foreign = app
            .request("GET", &format!("/items/{}", id), Some(&bob_token), None)
            .await;
        let missing = app
            .request("GET", &format!("/items/{}", id + 1000), Some(&bob_token), None)
            .await;

        assert_eq!(foreign.0, StatusCode::NOT_FOUND);
        assert_eq!(
            foreign.1,
            json!({"success": false, "message": format!("Item with ID {} not found", id), "data": null})
        );
        assert_eq!(missing.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_integer_id_is_bad_request() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;

        for method in ["GET", "PUT", "DELETE"] {
            let body = (method == "PUT").then(|| json!({"name": "x"}));
            let (status, response) = app.request(method, "/items/abc", Some(&token), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", method);
            assert_eq!(response["success"], false);
        }
    }

    #[tokio::test]
    async fn test_update_preserves_id_and_owner() {
        let app = TestApp::new().await;
        let (alice, alice_token) = app.user("alice@example.com").await;
        let (bob, _) = app.user("bob@example.com").await;
        let item = app.create_item(&alice_token, "Shampoo", 15).await;
        let id = item["id"].as_i64().unwrap();

        let (status, body) = app
            .request(
                "PUT",
                &format!("/items/{}", id),
                Some(&alice_token),
                Some(json!({"id": id + 50, "name": "Conditioner", "qty": 4, "user_id": bob})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id);
        assert_eq!(body["data"]["user_id"], alice);
        assert_eq!(body["data"]["name"], "Conditioner");

        let (_, body) = app
            .request("GET", &format!("/items/{}", id), Some(&alice_token), None)
            .await;
        assert_eq!(body["data"]["id"], id);
        assert_eq!(body["data"]["user_id"], alice);
        assert_eq!(body["data"]["name"], "Conditioner");
        assert_eq!(body["data"]["qty"], 4);
    }

    #[tokio::test]
    async fn test_update_requires_name() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;
        let item = app.create_item(&token, "Shampoo", 15).await;

        let (status, body) = app
            .request(
                "PUT",
                &format!("/items/{}", item["id"]),
                Some(&token),
                Some(json!({"qty": 3})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Name is required");
    }

    #[tokio::test]
    async fn test_update_foreign_item_is_not_found() {
        let app = TestApp::new().await;
        let (_, alice_token) = app.user("alice@example.com").await;
        let (_, bob_token) = app.user("bob@example.com").await;
        let item = app.create_item(&alice_token, "Shampoo", 15).await;
        let id = item["id"].as_i64().unwrap();

        let (status, _) = app
            .request(
                "PUT",
                &format!("/items/{}", id),
                Some(&bob_token),
                Some(json!({"name": "Stolen", "qty": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = app
            .request("GET", &format!("/items/{}", id), Some(&alice_token), None)
            .await;
        assert_eq!(body["data"]["name"], "Shampoo");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;
        let item = app.create_item(&token, "Shampoo", 15).await;
        let uri = format!("/items/{}", item["id"]);

        let (status, body) = app.request("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "", "data": null}));

        let (status, _) = app.request("GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.request("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_foreign_item_is_not_found() {
        let app = TestApp::new().await;
        let (_, alice_token) = app.user("alice@example.com").await;
        let (_, bob_token) = app.user("bob@example.com").await;
        let item = app.create_item(&alice_token, "Shampoo", 15).await;
        let uri = format!("/items/{}", item["id"]);

        let (status, _) = app.request("DELETE", &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.request("GET", &uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_reject_bad_tokens() {
        let app = TestApp::new().await;
        let (alice, _) = app.user("alice@example.com").await;

        let claims = Claims {
            user_id: alice,
            iat: None,
            exp: None,
        };
        let wrong_secret = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"not-the-secret"),
        )
        .unwrap();
        let wrong_algorithm = {
            // RS256 header over an HMAC signature with the real secret
            let token = encode(
                &Header::default(),
                &claims,
                &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
            )
            .unwrap();
            let rest = token.split_once('.').unwrap().1;
            format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}", rest)
        };

        let routes = [
            ("POST", "/items"),
            ("GET", "/items"),
            ("GET", "/items/1"),
            ("PUT", "/items/1"),
            ("DELETE", "/items/1"),
        ];

        for (method, uri) in routes {
            let body = matches!(method, "POST" | "PUT").then(|| json!({"name": "x", "qty": 1}));

            for token in [wrong_secret.as_str(), wrong_algorithm.as_str()] {
                let (status, response) = app.request(method, uri, Some(token), body.clone()).await;
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
                assert_eq!(
                    response,
                    json!({"success": false, "message": "", "data": null})
                );
            }

            let (status, _) = app.request(method, uri, None, body.clone()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} without token", method, uri);
        }
    }

    #[tokio::test]
    async fn test_basic_scheme_is_rejected() {
        let app = TestApp::new().await;
        let (_, token) = app.user("alice@example.com").await;

        let request = Request::builder()
            .uri("/items")
            .header(header::AUTHORIZATION, format!("Basic {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_disabled_routes_are_global() {
        let app = TestApp::with_options(false, false).await;

        let (status, body) = app
            .request("POST", "/items", None, Some(json!({"name": "Crate", "qty": 2})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user_id"], Value::Null);
        let uri = format!("/items/{}", body["data"]["id"]);

        let (_, body) = app.request("GET", "/items", None, None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = app
            .request("PUT", &uri, None, Some(json!({"name": "Pallet", "qty": 1})))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.request("DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
