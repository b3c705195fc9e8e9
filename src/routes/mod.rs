use axum::{
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CorsConfig;
use crate::handlers;
use crate::state::AppState;

pub mod health;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn success_msg(message: impl Into<String>) -> Self {
        Self {
            code: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Build the CORS layer; no configured origins means any origin
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    // API routes
    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog routes
        .route(
            "/roles",
            get(handlers::catalog::list_roles).post(handlers::role::add_role),
        )
        .route(
            "/roles/:id",
            put(handlers::role::update_role).delete(handlers::role::delete_role),
        )
        .route("/permissions", get(handlers::catalog::list_permissions))
        .route("/modules", get(handlers::catalog::list_modules))
        .route("/forms", get(handlers::catalog::list_forms));

    Router::new()
        .nest("/api", api_routes)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Fallback handler for 404
pub async fn fallback() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("Not Found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_json() {
        let ok = serde_json::to_value(ApiResponse::success(vec!["Admin"])).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({ "code": true, "message": "success", "data": ["Admin"] })
        );

        let err = serde_json::to_value(ApiResponse::<()>::error("Not Found")).unwrap();
        assert_eq!(err, serde_json::json!({ "code": false, "message": "Not Found" }));
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let config = CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string(), "bad\norigin".to_string()],
        };
        // building must not panic on the invalid entry
        let _ = cors_layer(&config);
    }
}
