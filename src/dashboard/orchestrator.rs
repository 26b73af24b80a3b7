use tracing::{error, info, warn};

use crate::dashboard::client::AggregationApi;
use crate::dashboard::pagination::{PageAction, Pagination};
use crate::dashboard::table::{PagedTableState, RankingTable};
use crate::models::{
    DailyStat, DateRange, DeveloperRanking, FunctionRanking, GroupRanking, Overview, PageQuery,
    RankingEntity, RankingKind, ToolRanking, WorkspaceRanking,
};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard data. Please try again.";

/// Lifecycle of the whole dashboard. Follow-up fetches never leave `Ready`.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Ready(Box<DashboardData>),
    Error(String),
}

/// Activity chart and the range it was fetched for.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesState {
    pub range: DateRange,
    pub points: Vec<DailyStat>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub overview: Overview,
    pub series: SeriesState,
    pub developers: RankingTable<DeveloperRanking>,
    pub workspaces: RankingTable<WorkspaceRanking>,
    pub groups: RankingTable<GroupRanking>,
    pub tools: PagedTableState<ToolRanking>,
    pub functions: PagedTableState<FunctionRanking>,
}

impl DashboardData {
    pub fn pagination(&self, kind: RankingKind) -> Pagination {
        match kind {
            RankingKind::Developers => self.developers.state.pagination(),
            RankingKind::Workspaces => self.workspaces.state.pagination(),
            RankingKind::Groups => self.groups.state.pagination(),
            RankingKind::Tools => self.tools.pagination(),
            RankingKind::Functions => self.functions.pagination(),
        }
    }

    pub fn table_error(&self, kind: RankingKind) -> Option<&str> {
        match kind {
            RankingKind::Developers => self.developers.state.error(),
            RankingKind::Workspaces => self.workspaces.state.error(),
            RankingKind::Groups => self.groups.state.error(),
            RankingKind::Tools => self.tools.error(),
            RankingKind::Functions => self.functions.error(),
        }
    }
}

/// User-visible message about a failed follow-up fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

/// Notices of one dashboard; ids are unique within the instance.
#[derive(Debug, Default)]
pub struct Notices {
    next_id: u64,
    items: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Notice {
            id,
            message: message.into(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|notice| notice.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Nothing to fetch: control disabled, invalid input or dashboard not ready.
    Skipped,
    Updated,
    /// The section kept its previous data and recorded the error.
    Failed,
}

/// Owns the dashboard state and drives every fetch against the API.
///
/// All mutating operations take `&mut self`, so a dashboard never has two
/// fetches for the same table in flight.
pub struct Dashboard<A> {
    api: A,
    range: DateRange,
    page_size: i64,
    state: DashboardState,
    notices: Notices,
}

impl<A: AggregationApi> Dashboard<A> {
    pub fn new(api: A, range: DateRange, page_size: i64) -> Self {
        Self {
            api,
            range,
            page_size: page_size.max(1),
            state: DashboardState::Loading,
            notices: Notices::default(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn data(&self) -> Option<&DashboardData> {
        match &self.state {
            DashboardState::Ready(data) => Some(&**data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut DashboardData> {
        match &mut self.state {
            DashboardState::Ready(data) => Some(&mut **data),
            _ => None,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.items()
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    /// Fetches everything at once. Any single failure puts the whole
    /// dashboard in `Error`; partial results are discarded.
    pub async fn load(&mut self) -> &DashboardState {
        self.state = DashboardState::Loading;
        let first = PageQuery::first(self.page_size);
        let range = self.range;
        let api = &self.api;

        let result = tokio::try_join!(
            api.overview(),
            api.daily_stats(range),
            api.ranking::<DeveloperRanking>(first),
            api.ranking::<WorkspaceRanking>(first),
            api.ranking::<GroupRanking>(first),
            api.ranking::<ToolRanking>(first),
            api.ranking::<FunctionRanking>(first),
        );

        self.state = match result {
            Ok((overview, points, developers, workspaces, groups, tools, functions)) => {
                info!(
                    "Dashboard loaded: {} days, {} developers, {} workspaces",
                    points.len(),
                    developers.total,
                    workspaces.total
                );
                DashboardState::Ready(Box::new(DashboardData {
                    overview,
                    series: SeriesState {
                        range,
                        points,
                        error: None,
                    },
                    developers: RankingTable::new(developers),
                    workspaces: RankingTable::new(workspaces),
                    groups: RankingTable::new(groups),
                    tools: PagedTableState::new(tools),
                    functions: PagedTableState::new(functions),
                }))
            }
            Err(e) => {
                error!("Dashboard load failed: {}", e);
                DashboardState::Error(LOAD_FAILED_MESSAGE.to_string())
            }
        };

        &self.state
    }

    /// The only recovery from `Error`: a full reload.
    pub async fn retry(&mut self) -> &DashboardState {
        self.load().await
    }

    /// Moves one table to its previous or next page.
    pub async fn navigate(&mut self, kind: RankingKind, action: PageAction) -> FetchOutcome {
        let data = match &mut self.state {
            DashboardState::Ready(data) => data,
            _ => return FetchOutcome::Skipped,
        };
        let api = &self.api;
        let notices = &mut self.notices;

        match kind {
            RankingKind::Developers => {
                refetch_page(api, &mut data.developers.state, action, notices).await
            }
            RankingKind::Workspaces => {
                refetch_page(api, &mut data.workspaces.state, action, notices).await
            }
            RankingKind::Groups => refetch_page(api, &mut data.groups.state, action, notices).await,
            RankingKind::Tools => refetch_page(api, &mut data.tools, action, notices).await,
            RankingKind::Functions => refetch_page(api, &mut data.functions, action, notices).await,
        }
    }

    /// Reloads the time series for `range`; the ranking tables are untouched.
    pub async fn set_date_range(&mut self, range: DateRange) -> FetchOutcome {
        if !range.is_ordered() {
            self.notices.push("Start date must not be after end date");
            return FetchOutcome::Skipped;
        }

        let data = match &mut self.state {
            DashboardState::Ready(data) => data,
            _ => {
                self.range = range;
                return FetchOutcome::Skipped;
            }
        };

        match self.api.daily_stats(range).await {
            Ok(points) => {
                data.series = SeriesState {
                    range,
                    points,
                    error: None,
                };
                self.range = range;
                FetchOutcome::Updated
            }
            Err(e) => {
                warn!("Failed to load daily stats for {} ~ {}: {}", range.from, range.to, e);
                let message = format!(
                    "Failed to load activity for {} ~ {}",
                    range.from, range.to
                );
                data.series.error = Some(message.clone());
                self.notices.push(message);
                FetchOutcome::Failed
            }
        }
    }
}

async fn refetch_page<A, T>(
    api: &A,
    table: &mut PagedTableState<T>,
    action: PageAction,
    notices: &mut Notices,
) -> FetchOutcome
where
    A: AggregationApi,
    T: RankingEntity,
{
    let pagination = table.pagination();
    let Some(offset) = pagination.apply(action) else {
        return FetchOutcome::Skipped;
    };
    let query = PageQuery::new(offset as i64, pagination.limit() as i64);

    match api.ranking::<T>(query).await {
        Ok(page) => {
            table.replace(page);
            FetchOutcome::Updated
        }
        Err(e) => {
            warn!("Failed to load {} at offset {}: {}", T::KIND, offset, e);
            let message = format!(
                "Failed to load {} page {}",
                T::KIND,
                offset / pagination.limit() + 1
            );
            table.fail(message.clone());
            notices.push(message);
            FetchOutcome::Failed
        }
    }
}
