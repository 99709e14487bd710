// User handlers
// HTTP handlers for user management operations
//
// Each handler is registered at both the bare path (/users) and the
// /api-prefixed path so the service works whether or not the reverse proxy
// rewrites the prefix.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::{db::Database, error::ApiError, models::user::CreateUserRequest};

/// Create a new user
/// POST /users, POST /api/users
pub async fn create_user(
    State(db): State<Arc<Database>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = request
        .normalized_name()
        .ok_or_else(|| ApiError::validation("name required"))?;

    let user = db.create_user(&name).await?;

    info!("Successfully created user with id: {}", user.id);
    Ok(Json(user))
}

/// Get all users, newest first
/// GET /users, GET /api/users
pub async fn list_users(
    State(db): State<Arc<Database>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = db.list_users().await?;

    info!("Retrieved {} users", users.len());
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::Response;
    use serde_json::json;

    use super::*;
    use crate::config::DatabaseConfig;

    /// Pool pointed at a closed port. Connections are lazy, so this only
    /// fails once a handler actually reaches for the database.
    fn unreachable_database() -> Arc<Database> {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            database: "pedidos".to_string(),
            username: "pedido".to_string(),
            password: "pedido".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 2,
        };
        Arc::new(Database::new(&config).expect("pool creation is lazy"))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_rejects_missing_and_blank_names() {
        let db = unreachable_database();

        // Validation runs before any pool access, so every variant answers
        // 400 even though the database is unreachable.
        for name in [None, Some("".to_string()), Some("   ".to_string())] {
            let request = CreateUserRequest { name };
            let response = match create_user(State(Arc::clone(&db)), Json(request)).await {
                Ok(_) => panic!("blank name must not create a user"),
                Err(e) => e.into_response(),
            };

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await, json!({ "error": "name required" }));
        }
    }
}
