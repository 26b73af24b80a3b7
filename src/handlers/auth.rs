use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;

use crate::middleware::{require_principal, Principal};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: String,
    pub is_admin: bool,
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            require_principal,
        ))
}

/// GET /api/auth/me - who the dashboard thinks the caller is
pub async fn get_me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Json<MeResponse> {
    Json(MeResponse {
        is_admin: state.auth.is_admin(&principal),
        user: principal.identifier,
    })
}
