pub mod auth;
pub mod health;
pub mod packages;
pub mod rankings;
pub mod stats;

use axum::{
    http::{header, HeaderName},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use validator::ValidationErrors;

use crate::cache::ResponseCache;
use crate::errors::AppError;
use crate::AppState;

/// All routes served by the dashboard API, without transport layers.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(stats::router())
        .nest("/rankings", rankings::router())
        .nest("/auth", auth::router(&state))
        .nest("/packages", packages::router(&state));

    Router::new()
        .merge(health::router())
        .nest("/api", api)
        .with_state(state)
}

pub type CacheHeader = [(HeaderName, &'static str); 1];

/// Aggregations are recomputed at most once a minute.
pub fn public_cache() -> CacheHeader {
    [(header::CACHE_CONTROL, "public, max-age=60")]
}

pub fn no_cache() -> CacheHeader {
    [(header::CACHE_CONTROL, "no-cache")]
}

pub type CachedJson<T> = (CacheHeader, Json<T>);

/// Turns an offset/limit validation failure into a message fit for API clients.
pub fn invalid_pagination(errors: &ValidationErrors, max_limit: i64) -> AppError {
    let message = if errors.errors().contains_key("limit") {
        format!("limit must be between 1 and {}", max_limit)
    } else {
        "offset must not be negative".to_string()
    };
    AppError::BadRequest(message)
}

/// Serves `key` from the response cache, running `load` on a miss.
pub async fn cached<T, F, Fut>(cache: &ResponseCache, key: &str, load: F) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    if let Some(hit) = cache.get::<T>(key) {
        tracing::debug!("Cache hit for {}", key);
        return Ok(hit);
    }

    let value = load().await?;
    if let Err(e) = cache.set(key, &value) {
        tracing::warn!("Failed to cache {}: {}", key, e);
    }
    Ok(value)
}
