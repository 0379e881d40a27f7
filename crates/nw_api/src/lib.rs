use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod auth;
pub mod cache;
pub mod handlers;
pub mod query;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let state = Arc::new(state);
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/fetch", post(handlers::trigger_fetch))
        .route("/api/articles/:id", get(handlers::show_article))
        .route(
            "/api/preferences",
            get(handlers::show_preferences)
                .post(handlers::save_preferences)
                .delete(handlers::delete_preferences),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(cors)
        .with_state(state)
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use nw_core::{Error, Result};
}
