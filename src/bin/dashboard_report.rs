use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use openwebui_dashboard::calendar;
use openwebui_dashboard::dashboard::widgets::{
    display_id, format_count, format_timestamp, RatingBadge, StatusBadge,
};
use openwebui_dashboard::dashboard::{
    Dashboard, DashboardData, DashboardState, DeveloperSortKey, HttpAggregationClient, PageAction,
    Pagination, Rated, WorkspaceSortKey,
};
use openwebui_dashboard::models::{DateRange, RankingKind};

/// Print the Open WebUI usage dashboard in the terminal.
#[derive(Debug, Parser)]
#[command(name = "dashboard-report")]
struct Args {
    /// Base URL of the dashboard API
    #[arg(long, env = "DASHBOARD_API_URL", default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// Sent as X-Auth-User
    #[arg(long, env = "DASHBOARD_USER")]
    user: Option<String>,

    /// First day of the activity chart (YYYY-MM-DD, KST)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the activity chart (YYYY-MM-DD, KST)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Rows per ranking page
    #[arg(long, default_value_t = 20)]
    limit: i64,

    /// Ranking page to show (1-based), applied to every table
    #[arg(long, default_value_t = 1)]
    page: u64,

    /// Order developers and workspaces by rating instead of chats
    #[arg(long)]
    sort_by_rating: bool,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("openwebui_dashboard=warn,warn")),
        )
        .init();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let default_range = calendar::default_client_range(Utc::now());
    let range = DateRange::new(
        args.from.unwrap_or(default_range.from),
        args.to.unwrap_or(default_range.to),
    );
    if !range.is_ordered() {
        anyhow::bail!("--from {} is after --to {}", range.from, range.to);
    }

    let client = HttpAggregationClient::new(
        &args.api_url,
        args.user.clone(),
        Duration::from_secs(args.timeout_secs),
    )?;
    let mut dashboard = Dashboard::new(client, range, args.limit);
    if let DashboardState::Error(message) = dashboard.load().await {
        anyhow::bail!("{}", message);
    }

    for _ in 1..args.page.max(1) {
        for kind in RankingKind::ALL {
            dashboard.navigate(kind, PageAction::Next).await;
        }
    }

    if let Some(data) = dashboard.data_mut() {
        if args.sort_by_rating {
            data.developers.select_sort(DeveloperSortKey::Rating);
            data.workspaces.select_sort(WorkspaceSortKey::Rating);
        }
    }

    let Some(data) = dashboard.data() else {
        anyhow::bail!("dashboard is not ready");
    };
    print_overview(data);
    print_series(data);
    print_developers(data);
    print_workspaces(data);
    print_groups(data);
    print_tools(data);
    print_functions(data);

    for notice in dashboard.notices() {
        eprintln!("⚠️  {}", notice.message);
    }

    Ok(())
}

fn print_overview(data: &DashboardData) {
    let o = &data.overview;
    println!("== Overview");
    println!(
        "chats {} | messages {} | models {} | feedbacks {} | tools {} | functions {}",
        format_count(o.total_chats),
        format_count(o.total_messages),
        format_count(o.total_models),
        format_count(o.total_feedbacks),
        format_count(o.total_tools),
        format_count(o.total_functions),
    );
}

fn print_series(data: &DashboardData) {
    let series = &data.series;
    println!();
    println!("== Daily activity {} ~ {}", series.range.from, series.range.to);
    if let Some(error) = &series.error {
        println!("   ({})", error);
    }
    println!("{:<12} {:>8} {:>10} {:>7}", "date", "chats", "messages", "users");
    for point in &series.points {
        println!(
            "{:<12} {:>8} {:>10} {:>7}",
            point.date.to_string(),
            format_count(point.chat_count),
            format_count(point.message_count),
            format_count(point.user_count),
        );
    }
}

fn print_header(title: &str, pagination: Pagination, error: Option<&str>) {
    println!();
    match pagination.visible_range() {
        Some((first, last)) if pagination.is_needed() => println!(
            "== {} ({}-{} of {}, page {}/{})",
            title,
            first,
            last,
            pagination.total(),
            pagination.current_page(),
            pagination.total_pages()
        ),
        _ => println!("== {} ({})", title, pagination.total()),
    }
    if let Some(error) = error {
        println!("   ({})", error);
    }
}

fn print_developers(data: &DashboardData) {
    let table = &data.developers;
    print_header(
        "Developers",
        table.state.pagination(),
        table.state.error(),
    );
    println!(
        "{:<24} {:>10} {:>7} {:>8} {:>10} {:>7}",
        "developer", "workspaces", "users", "chats", "messages", "rating"
    );
    for row in table.view() {
        println!(
            "{:<24} {:>10} {:>7} {:>8} {:>10} {:>7}",
            display_id(row.email.as_deref()),
            row.workspace_count,
            format_count(row.total_users),
            format_count(row.total_chats),
            format_count(row.total_messages),
            RatingBadge::new(row.rating()).to_string(),
        );
    }
}

fn print_workspaces(data: &DashboardData) {
    let table = &data.workspaces;
    print_header(
        "Workspaces",
        table.state.pagination(),
        table.state.error(),
    );
    println!(
        "{:<28} {:<18} {:>7} {:>8} {:>10} {:>7}",
        "workspace", "developer", "users", "chats", "messages", "rating"
    );
    for row in table.view() {
        println!(
            "{:<28} {:<18} {:>7} {:>8} {:>10} {:>7}",
            row.name,
            display_id(row.developer_email.as_deref()),
            format_count(row.user_count),
            format_count(row.chat_count),
            format_count(row.message_count),
            RatingBadge::new(row.rating()).to_string(),
        );
    }
}

fn print_groups(data: &DashboardData) {
    let table = &data.groups;
    print_header("Groups", table.state.pagination(), table.state.error());
    println!(
        "{:<28} {:>8} {:>10} {:>12} {:>15}",
        "group", "members", "feedbacks", "chats/member", "messages/member"
    );
    for row in table.view() {
        println!(
            "{:<28} {:>8} {:>10} {:>12.1} {:>15.1}",
            row.group_name,
            row.member_count,
            format_count(row.total_feedbacks),
            row.chats_per_member,
            row.messages_per_member,
        );
    }
}

fn print_tools(data: &DashboardData) {
    let table = &data.tools;
    print_header("Tools", table.pagination(), table.error());
    println!(
        "{:<28} {:<18} {:<17} {:<17}",
        "tool", "creator", "created", "updated"
    );
    for row in table.rows() {
        println!(
            "{:<28} {:<18} {:<17} {:<17}",
            row.name,
            display_id(row.creator_email.as_deref()),
            format_timestamp(row.created_at.as_deref()),
            format_timestamp(row.updated_at.as_deref()),
        );
    }
}

fn print_functions(data: &DashboardData) {
    let table = &data.functions;
    print_header("Functions", table.pagination(), table.error());
    println!(
        "{:<28} {:<7} {:<7} {:<7} {:<18} {:<17}",
        "function", "type", "active", "global", "creator", "updated"
    );
    for row in table.rows() {
        println!(
            "{:<28} {:<7} {:<7} {:<7} {:<18} {:<17}",
            row.name,
            format!("{:?}", row.function_type).to_lowercase(),
            StatusBadge::new(row.is_active).to_string(),
            StatusBadge::new(row.is_global).to_string(),
            display_id(row.creator_email.as_deref()),
            format_timestamp(row.updated_at.as_deref()),
        );
    }
}
