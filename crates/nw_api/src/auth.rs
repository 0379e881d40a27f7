use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::AppState;

/// The authenticated user id, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"status": "error", "message": "Unauthenticated."})),
    )
        .into_response()
}

/// Bearer-token guard for every API route. 401 with no data on any miss.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthenticated();
    };

    match state.storage.user_for_token(token).await {
        Ok(Some(user_id)) => {
            req.extensions_mut().insert(AuthUser(user_id));
            next.run(req).await
        }
        Ok(None) => unauthenticated(),
        Err(e) => {
            error!("Token lookup failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": "Internal server error."})),
            )
                .into_response()
        }
    }
}
