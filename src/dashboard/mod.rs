//! Client side of the analytics dashboard: fetching pages from the
//! aggregation API, ordering and paging them, and formatting cells.

pub mod client;
pub mod orchestrator;
pub mod pagination;
pub mod ranking;
pub mod table;
pub mod widgets;

pub use client::{AggregationApi, HttpAggregationClient};
pub use orchestrator::{Dashboard, DashboardData, DashboardState, FetchOutcome, Notice};
pub use pagination::{PageAction, Pagination};
pub use ranking::{
    sort_rows, DeveloperSortKey, GroupSortKey, RankingRow, Rated, SortDirection, SortState,
    WorkspaceSortKey,
};
pub use table::{PagedTableState, RankingTable};
