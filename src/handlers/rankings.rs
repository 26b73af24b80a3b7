use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use sqlx::{postgres::PgRow, FromRow, PgPool};
use validator::Validate;

use crate::errors::AppError;
use crate::handlers::{cached, invalid_pagination, public_cache, CachedJson};
use crate::models::{
    DeveloperRanking, FunctionRanking, GroupRanking, Page, PageQuery, RankingEntity, ToolRanking,
    WorkspaceRanking, MAX_PAGE_LIMIT,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/developers", get(developer_ranking))
        .route("/workspaces", get(workspace_ranking))
        .route("/groups", get(group_ranking))
        .route("/tools", get(tool_ranking))
        .route("/functions", get(function_ranking))
}

// Each ranking is a `ranked` CTE; the page and the total are read from it
// separately so a page past the end still reports the real total.

const WORKSPACE_RANKED: &str = r#"
    WITH workspace_chats AS (
        SELECT
            m.value AS workspace,
            count(*) AS chat_count,
            coalesce(sum(json_array_length(c.chat->'messages')), 0)::bigint AS message_count,
            count(DISTINCT c.user_id) AS user_count
        FROM chat c, json_array_elements_text(c.chat->'models') AS m(value)
        GROUP BY m.value
    ),
    workspace_feedback AS (
        SELECT
            f.data->>'model_id' AS workspace,
            count(*) FILTER (WHERE (f.data->>'rating')::int > 0) AS positive,
            count(*) FILTER (WHERE (f.data->>'rating')::int < 0) AS negative
        FROM feedback f
        GROUP BY f.data->>'model_id'
    ),
    ranked AS (
        SELECT
            wc.workspace AS id,
            coalesce(m.name, wc.workspace) AS name,
            u.email AS developer_email,
            wc.user_count,
            wc.chat_count,
            wc.message_count,
            coalesce(wf.positive, 0) AS positive,
            coalesce(wf.negative, 0) AS negative
        FROM workspace_chats wc
        JOIN model m ON wc.workspace = m.id
        LEFT JOIN "user" u ON m.user_id = u.id
        LEFT JOIN workspace_feedback wf ON wc.workspace = wf.workspace
    )
"#;

const DEVELOPER_RANKED: &str = r#"
    WITH workspace_metrics AS (
        SELECT
            mv.value AS workspace,
            count(*) AS chat_count,
            coalesce(sum(json_array_length(c.chat->'messages')), 0) AS message_count,
            count(DISTINCT c.user_id) AS user_count
        FROM chat c, json_array_elements_text(c.chat->'models') AS mv(value)
        GROUP BY mv.value
    ),
    workspace_feedback AS (
        SELECT
            f.data->>'model_id' AS workspace,
            count(*) FILTER (WHERE (f.data->>'rating')::int > 0) AS positive,
            count(*) FILTER (WHERE (f.data->>'rating')::int < 0) AS negative
        FROM feedback f
        GROUP BY f.data->>'model_id'
    ),
    ranked AS (
        SELECT
            u.id AS user_id,
            u.name AS user_name,
            u.email,
            count(DISTINCT m.id) AS workspace_count,
            coalesce(sum(wm.user_count), 0)::bigint AS total_users,
            coalesce(sum(wm.chat_count), 0)::bigint AS total_chats,
            coalesce(sum(wm.message_count), 0)::bigint AS total_messages,
            coalesce(sum(wf.positive), 0)::bigint AS total_positive,
            coalesce(sum(wf.negative), 0)::bigint AS total_negative
        FROM model m
        JOIN "user" u ON m.user_id = u.id
        LEFT JOIN workspace_metrics wm ON m.id = wm.workspace
        LEFT JOIN workspace_feedback wf ON m.id = wf.workspace
        GROUP BY u.id, u.name, u.email
    )
"#;

const GROUP_RANKED: &str = r#"
    WITH group_members AS (
        SELECT
            g.id AS group_id,
            g.name AS group_name,
            gm.user_id,
            count(*) OVER (PARTITION BY g.id) AS member_count
        FROM "group" g
        JOIN group_member gm ON g.id = gm.group_id
    ),
    user_usage AS (
        SELECT
            c.user_id,
            count(*) AS chat_count,
            coalesce(sum(json_array_length(c.chat->'messages')), 0) AS message_count
        FROM chat c, json_array_elements_text(c.chat->'models') AS m(value)
        GROUP BY c.user_id
    ),
    user_feedback AS (
        SELECT f.user_id, count(*) AS total_feedbacks
        FROM feedback f
        WHERE f.data->>'model_id' IN (SELECT id FROM model)
        GROUP BY f.user_id
    ),
    ranked AS (
        SELECT
            gm.group_id,
            gm.group_name,
            gm.member_count,
            coalesce(sum(uu.chat_count), 0)::bigint AS total_chats,
            coalesce(sum(uu.message_count), 0)::bigint AS total_messages,
            coalesce(sum(uf.total_feedbacks), 0)::bigint AS total_feedbacks,
            coalesce(round(coalesce(sum(uu.chat_count), 0)::numeric
                / NULLIF(gm.member_count, 0), 1), 0)::float8 AS chats_per_member,
            coalesce(round(coalesce(sum(uu.message_count), 0)::numeric
                / NULLIF(gm.member_count, 0), 1), 0)::float8 AS messages_per_member
        FROM group_members gm
        LEFT JOIN user_usage uu ON gm.user_id = uu.user_id
        LEFT JOIN user_feedback uf ON gm.user_id = uf.user_id
        GROUP BY gm.group_id, gm.group_name, gm.member_count
    )
"#;

const TOOL_RANKED: &str = r#"
    WITH ranked AS (
        SELECT
            t.id,
            t.name,
            u.email AS creator_email,
            to_char(to_timestamp(t.created_at) AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
            to_char(to_timestamp(t.updated_at) AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at,
            t.updated_at AS updated_epoch
        FROM tool t
        LEFT JOIN "user" u ON t.user_id = u.id
    )
"#;

const FUNCTION_RANKED: &str = r#"
    WITH ranked AS (
        SELECT
            f.id,
            f.name,
            f.type AS function_type,
            coalesce(f.is_active, false) AS is_active,
            coalesce(f.is_global, false) AS is_global,
            u.email AS creator_email,
            to_char(to_timestamp(f.updated_at) AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at,
            f.updated_at AS updated_epoch
        FROM "function" f
        LEFT JOIN "user" u ON f.user_id = u.id
    )
"#;

/// GET /api/rankings/developers - workspace owners ranked by total chats
pub async fn developer_ranking(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<CachedJson<Page<DeveloperRanking>>, AppError> {
    serve_ranking(&state, query, DEVELOPER_RANKED, "total_chats DESC, user_id").await
}

/// GET /api/rankings/workspaces - workspaces ranked by chat count
pub async fn workspace_ranking(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<CachedJson<Page<WorkspaceRanking>>, AppError> {
    serve_ranking(&state, query, WORKSPACE_RANKED, "chat_count DESC, id").await
}

/// GET /api/rankings/groups - user groups ranked by chats per member
pub async fn group_ranking(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<CachedJson<Page<GroupRanking>>, AppError> {
    serve_ranking(&state, query, GROUP_RANKED, "chats_per_member DESC NULLS LAST, group_id").await
}

/// GET /api/rankings/tools - most recently updated tools first
pub async fn tool_ranking(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<CachedJson<Page<ToolRanking>>, AppError> {
    serve_ranking(&state, query, TOOL_RANKED, "updated_epoch DESC NULLS LAST, id").await
}

/// GET /api/rankings/functions - most recently updated functions first
pub async fn function_ranking(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<CachedJson<Page<FunctionRanking>>, AppError> {
    serve_ranking(&state, query, FUNCTION_RANKED, "updated_epoch DESC NULLS LAST, id").await
}

async fn serve_ranking<T>(
    state: &AppState,
    query: PageQuery,
    ranked_cte: &str,
    order_by: &str,
) -> Result<CachedJson<Page<T>>, AppError>
where
    T: RankingEntity + for<'r> FromRow<'r, PgRow> + Unpin,
{
    query
        .validate()
        .map_err(|e| invalid_pagination(&e, MAX_PAGE_LIMIT))?;

    let key = format!("rankings:{}:{}:{}", T::KIND, query.offset, query.limit);
    let page = cached(&state.cache, &key, || {
        fetch_ranking_page::<T>(&state.db, query, ranked_cte, order_by)
    })
    .await?;

    Ok((public_cache(), Json(page)))
}

async fn fetch_ranking_page<T>(
    db: &PgPool,
    query: PageQuery,
    ranked_cte: &str,
    order_by: &str,
) -> Result<Page<T>, AppError>
where
    T: RankingEntity + for<'r> FromRow<'r, PgRow> + Unpin,
{
    let total: i64 = sqlx::query_scalar(&format!("{} SELECT count(*) FROM ranked", ranked_cte))
        .fetch_one(db)
        .await?;

    if total == 0 || query.offset >= total {
        return Ok(Page::new(Vec::new(), total, query));
    }

    let items = sqlx::query_as::<_, T>(&format!(
        "{} SELECT * FROM ranked ORDER BY {} LIMIT $1 OFFSET $2",
        ranked_cte, order_by
    ))
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(db)
    .await?;

    tracing::debug!(
        "Served {} ranking page offset={} limit={} ({} of {})",
        T::KIND,
        query.offset,
        query.limit,
        items.len(),
        total
    );

    Ok(Page::new(items, total, query))
}
