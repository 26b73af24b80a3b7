use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use sqlx::{Postgres, Transaction};
use validator::Validate;

use crate::errors::AppError;
use crate::handlers::{invalid_pagination, no_cache, CachedJson};
use crate::middleware::{require_principal, AuthContext, Principal};
use crate::models::{
    normalize_package_spec, AuditLogEntry, Package, PackageCreate, PackageListQuery, PackageStatus,
    PackageStatusUpdate, Page, PageQuery, MAX_PACKAGE_LIMIT,
};
use crate::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(add_package))
        .route("/audit-log", get(get_audit_log))
        .route("/:package_id", delete(delete_package))
        .route("/:package_id/status", patch(update_package_status))
        .route_layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            require_principal,
        ));

    Router::new()
        .route("/", get(list_packages))
        .merge(protected)
}

fn page_query(params: PackageListQuery) -> Result<PageQuery, AppError> {
    params
        .validate()
        .map_err(|e| invalid_pagination(&e, MAX_PACKAGE_LIMIT))?;
    Ok(PageQuery::new(params.offset, params.limit))
}

async fn log_audit(
    tx: &mut Transaction<'_, Postgres>,
    package_id: i32,
    package_name: &str,
    action: &str,
    user: &str,
    detail: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO package_audit_log (package_id, package_name, action, performed_by, detail)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(package_id)
    .bind(package_name)
    .bind(action)
    .bind(user)
    .bind(detail)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Requesters may withdraw their own packages; admins may remove any.
fn ensure_can_delete(auth: &AuthContext, principal: &Principal, added_by: &str) -> Result<(), AppError> {
    if added_by == principal.identifier || auth.is_admin(principal) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You can only delete packages you added".to_string(),
        ))
    }
}

/// GET /api/packages - requested packages, newest first
pub async fn list_packages(
    State(state): State<AppState>,
    Query(params): Query<PackageListQuery>,
) -> Result<CachedJson<Page<Package>>, AppError> {
    let query = page_query(params)?;

    let total: i64 = sqlx::query_scalar("SELECT count(*) FROM python_packages")
        .fetch_one(&state.db)
        .await?;

    let items = sqlx::query_as::<_, Package>(
        r#"
        SELECT id, package_name, added_by,
               added_at AT TIME ZONE 'Asia/Seoul' AS added_at,
               status, status_note
        FROM python_packages
        ORDER BY python_packages.added_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(&state.db)
    .await?;

    Ok((no_cache(), Json(Page::new(items, total, query))))
}

/// POST /api/packages - request a package; the caller is recorded as requester
pub async fn add_package(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<PackageCreate>,
) -> Result<(StatusCode, Json<Package>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    if payload.package_name.trim().is_empty() {
        return Err(AppError::BadRequest("Package name cannot be empty".to_string()));
    }
    let name = normalize_package_spec(&payload.package_name)
        .ok_or_else(|| AppError::BadRequest("Invalid package name format".to_string()))?;

    let mut tx = state.db.begin().await?;

    let inserted = sqlx::query_as::<_, Package>(
        r#"
        INSERT INTO python_packages (package_name, added_by)
        VALUES ($1, $2)
        RETURNING id, package_name, added_by,
                  added_at AT TIME ZONE 'Asia/Seoul' AS added_at,
                  status, status_note
        "#,
    )
    .bind(&name)
    .bind(&principal.identifier)
    .fetch_one(&mut *tx)
    .await;

    let package = match inserted {
        Ok(package) => package,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::Conflict(format!("Package '{}' already exists", name)));
        }
        Err(e) => {
            tracing::error!("Failed to add package '{}': {}", name, e);
            return Err(e.into());
        }
    };

    log_audit(&mut tx, package.id, &name, "added", &principal.identifier, None).await?;
    tx.commit().await?;

    tracing::info!("📦 Package '{}' requested by {}", name, principal.identifier);
    Ok((StatusCode::CREATED, Json(package)))
}

/// DELETE /api/packages/:package_id - requester or admin only
pub async fn delete_package(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(package_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let mut tx = state.db.begin().await?;

    let row: Option<(String, String)> = sqlx::query_as(
        "SELECT added_by, package_name FROM python_packages WHERE id = $1 FOR UPDATE",
    )
    .bind(package_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (added_by, package_name) =
        row.ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;

    ensure_can_delete(&state.auth, &principal, &added_by)?;

    sqlx::query("DELETE FROM python_packages WHERE id = $1")
        .bind(package_id)
        .execute(&mut *tx)
        .await?;
    log_audit(&mut tx, package_id, &package_name, "deleted", &principal.identifier, None).await?;
    tx.commit().await?;

    Ok(Json(json!({ "ok": true })))
}

/// PATCH /api/packages/:package_id/status - admin only
pub async fn update_package_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(package_id): Path<i32>,
    Json(payload): Json<PackageStatusUpdate>,
) -> Result<Json<Value>, AppError> {
    state
        .auth
        .require_admin(&principal, "Only admins can change package status")?;

    let status: PackageStatus = payload.status.parse().map_err(AppError::BadRequest)?;

    let mut tx = state.db.begin().await?;

    let package_name: Option<String> =
        sqlx::query_scalar("SELECT package_name FROM python_packages WHERE id = $1 FOR UPDATE")
            .bind(package_id)
            .fetch_optional(&mut *tx)
            .await?;
    let package_name = package_name.ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;

    sqlx::query(
        r#"
        UPDATE python_packages
        SET status = $2, status_note = $3,
            status_updated_by = $4, status_updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(package_id)
    .bind(status.as_str())
    .bind(payload.status_note.as_deref())
    .bind(&principal.identifier)
    .execute(&mut *tx)
    .await?;

    let action = format!("status:{}", status.as_str());
    log_audit(
        &mut tx,
        package_id,
        &package_name,
        &action,
        &principal.identifier,
        payload.status_note.as_deref(),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "ok": true })))
}

/// GET /api/packages/audit-log - admin only
pub async fn get_audit_log(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<PackageListQuery>,
) -> Result<CachedJson<Page<AuditLogEntry>>, AppError> {
    state.auth.require_admin(&principal, "Admin access required")?;
    let query = page_query(params)?;

    let total: i64 = sqlx::query_scalar("SELECT count(*) FROM package_audit_log")
        .fetch_one(&state.db)
        .await?;

    let items = sqlx::query_as::<_, AuditLogEntry>(
        r#"
        SELECT id, package_id, package_name, action, performed_by, detail,
               created_at AT TIME ZONE 'Asia/Seoul' AS created_at
        FROM package_audit_log
        ORDER BY package_audit_log.created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(&state.db)
    .await?;

    Ok((no_cache(), Json(Page::new(items, total, query))))
}
