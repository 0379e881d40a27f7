use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use nw_core::rank::{paginate, rank_articles};
use nw_core::{Error, UserPreference};

use crate::auth::AuthUser;
use crate::cache::{ARTICLE_TTL, LIST_TTL};
use crate::query::RawListQuery;
use crate::AppState;

fn success(data: Value) -> Json<Value> {
    Json(json!({"status": "success", "data": data}))
}

fn internal_error(e: Error) -> Response {
    error!("Request failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": "error", "message": "Internal server error."})),
    )
        .into_response()
}

/// GET /api/articles: filtered, preference-ranked, paginated listing.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(raw): Query<RawListQuery>,
) -> Response {
    let query = match raw.validate() {
        Ok(query) => query,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"status": "error", "message": errors})),
            )
                .into_response();
        }
    };

    let cache_key = query.cache_key(user_id);
    if let Some(cached) = state.cache.get(&cache_key).await {
        return Json(cached).into_response();
    }

    let mut articles = match state.storage.search_articles(&query.filter).await {
        Ok(articles) => articles,
        Err(e) => return internal_error(e),
    };

    // Preference lists re-rank but never filter.
    match state.storage.preferences(user_id).await {
        Ok(Some(prefs)) => rank_articles(&mut articles, &prefs),
        Ok(None) => {}
        Err(e) => return internal_error(e),
    }

    let page = paginate(articles, query.page, query.per_page);
    let envelope = json!({"status": "success", "data": page});
    state
        .cache
        .put(cache_key, envelope.clone(), LIST_TTL)
        .await;
    Json(envelope).into_response()
}

/// GET /api/articles/:id
pub async fn show_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    let cache_key = format!("article:{id}");
    if let Some(cached) = state.cache.get(&cache_key).await {
        return Json(cached).into_response();
    }

    match state.storage.article_by_id(id).await {
        Ok(Some(article)) => {
            let envelope = json!({"status": "success", "data": article});
            state
                .cache
                .put(cache_key, envelope.clone(), ARTICLE_TTL)
                .await;
            Json(envelope).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Article not found."})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PreferencePayload {
    pub preferred_sources: Option<Vec<String>>,
    pub preferred_categories: Option<Vec<String>>,
    pub preferred_authors: Option<Vec<String>>,
}

/// GET /api/preferences: the identity's stored preferences, or null.
pub async fn show_preferences(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Response {
    match state.storage.preferences(user_id).await {
        Ok(prefs) => success(json!(prefs)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/preferences: upsert, any field omittable.
pub async fn save_preferences(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<PreferencePayload>,
) -> Response {
    let prefs = UserPreference {
        user_id,
        preferred_sources: payload.preferred_sources,
        preferred_categories: payload.preferred_categories,
        preferred_authors: payload.preferred_authors,
    };
    match state.storage.save_preferences(&prefs).await {
        Ok(saved) => Json(json!({
            "status": "success",
            "message": "Preferences saved",
            "data": saved,
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/preferences
pub async fn delete_preferences(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Response {
    match state.storage.delete_preferences(user_id).await {
        Ok(()) => Json(json!({
            "status": "success",
            "message": "Preferences cleared",
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/articles/fetch: synchronously run the full ingestion batch.
pub async fn trigger_fetch(State(state): State<Arc<AppState>>) -> Response {
    let reports = state.fetcher.run_batch().await;
    Json(json!({
        "status": "success",
        "message": "Articles fetched successfully",
        "data": reports,
    }))
    .into_response()
}
