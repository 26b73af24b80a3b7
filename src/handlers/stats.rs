use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::calendar;
use crate::errors::AppError;
use crate::handlers::{cached, public_cache, CachedJson};
use crate::models::{DailyStat, DailyStatsQuery, DateRange, Overview};
use crate::AppState;

const MAX_RANGE_DAYS: i64 = 366;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/daily-stats", get(get_daily_stats))
}

/// GET /api/overview - aggregate counters across chats, models, feedback,
/// tools and functions
pub async fn get_overview(State(state): State<AppState>) -> Result<CachedJson<Overview>, AppError> {
    let overview = cached(&state.cache, "overview", || async {
        let row = sqlx::query_as::<_, Overview>(
            r#"
            WITH
                chat_stats AS (
                    SELECT count(*) AS total_chats,
                           coalesce(sum(json_array_length(chat->'messages')), 0)::bigint AS total_messages
                    FROM chat
                ),
                model_stats AS (
                    SELECT count(DISTINCT m.value) AS total_models
                    FROM chat, json_array_elements_text(chat->'models') AS m(value)
                ),
                feedback_stats AS (
                    SELECT count(*) AS total_feedbacks FROM feedback
                ),
                tool_stats AS (
                    SELECT count(*) AS total_tools FROM tool
                ),
                function_stats AS (
                    SELECT count(*) AS total_functions FROM "function"
                )
            SELECT cs.total_chats, cs.total_messages, ms.total_models, fs.total_feedbacks,
                   ts.total_tools, fns.total_functions
            FROM chat_stats cs, model_stats ms, feedback_stats fs, tool_stats ts, function_stats fns
            "#,
        )
        .fetch_one(&state.db)
        .await?;
        Ok::<_, AppError>(row)
    })
    .await?;

    Ok((public_cache(), Json(overview)))
}

/// GET /api/daily-stats?from=YYYY-MM-DD&to=YYYY-MM-DD
///
/// Days are KST calendar days. Days without chats are returned as zeros so
/// the chart always has one point per day.
pub async fn get_daily_stats(
    State(state): State<AppState>,
    Query(params): Query<DailyStatsQuery>,
) -> Result<CachedJson<Vec<DailyStat>>, AppError> {
    let range = resolve_range(params, Utc::now())?;
    let key = format!("daily-stats:{}:{}", range.from, range.to);

    let series = cached(&state.cache, &key, || async {
        let (from_ts, to_ts) = calendar::epoch_bounds(range);
        let rows = sqlx::query_as::<_, DailyStat>(
            r#"
            SELECT
                (to_timestamp(created_at) AT TIME ZONE 'Asia/Seoul')::date AS date,
                count(*) AS chat_count,
                coalesce(sum(json_array_length(chat->'messages')), 0)::bigint AS message_count,
                count(DISTINCT user_id) AS user_count
            FROM chat
            WHERE created_at >= $1 AND created_at < $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(from_ts)
        .bind(to_ts)
        .fetch_all(&state.db)
        .await?;

        Ok::<_, AppError>(fill_missing_days(range, rows))
    })
    .await?;

    Ok((public_cache(), Json(series)))
}

/// Applies the 30-day default and rejects inverted or oversized windows.
pub fn resolve_range(params: DailyStatsQuery, now: DateTime<Utc>) -> Result<DateRange, AppError> {
    let range = match (params.from, params.to) {
        (None, None) => calendar::default_server_range(now),
        (None, Some(to)) => calendar::trailing_window(to, 30),
        (Some(from), to) => DateRange::new(from, to.unwrap_or_else(|| calendar::today_kst(now))),
    };

    if !range.is_ordered() {
        return Err(AppError::BadRequest(format!(
            "'from' ({}) must not be after 'to' ({})",
            range.from, range.to
        )));
    }
    if range.len_days() > MAX_RANGE_DAYS {
        return Err(AppError::BadRequest(format!(
            "Date range cannot exceed {} days",
            MAX_RANGE_DAYS
        )));
    }
    Ok(range)
}

/// One entry per day of `range`, zero where the database had no rows.
pub fn fill_missing_days(range: DateRange, rows: Vec<DailyStat>) -> Vec<DailyStat> {
    let mut by_date: HashMap<_, _> = rows.into_iter().map(|row| (row.date, row)).collect();
    range
        .days()
        .map(|day| by_date.remove(&day).unwrap_or_else(|| DailyStat::zero(day)))
        .collect()
}
