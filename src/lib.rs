pub mod cache;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;

use sqlx::PgPool;
use std::sync::Arc;

use cache::ResponseCache;
use middleware::AuthContext;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: Arc<ResponseCache>,
    pub auth: Arc<AuthContext>,
}
