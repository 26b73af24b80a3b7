use crate::dashboard::pagination::Pagination;
use crate::dashboard::ranking::{sort_rows, RankingRow, SortState};
use crate::models::Page;

/// The displayed page of one table plus the error of its last refetch.
/// Shared by all five ranking tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedTableState<T> {
    page: Page<T>,
    error: Option<String>,
}

impl<T> PagedTableState<T> {
    pub fn new(page: Page<T>) -> Self {
        Self { page, error: None }
    }

    pub fn rows(&self) -> &[T] {
        &self.page.items
    }

    pub fn page(&self) -> &Page<T> {
        &self.page
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_page(&self.page)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Swaps in a freshly fetched page and clears any previous error.
    pub fn replace(&mut self, page: Page<T>) {
        self.page = page;
        self.error = None;
    }

    /// Records a failed refetch; the rows on screen stay as they were.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

/// A paged table whose rows can be re-ordered by column.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingTable<T: RankingRow> {
    pub state: PagedTableState<T>,
    pub sort: SortState<T::SortKey>,
}

impl<T: RankingRow> RankingTable<T> {
    pub fn new(page: Page<T>) -> Self {
        Self {
            state: PagedTableState::new(page),
            sort: SortState::new(T::default_sort_key()),
        }
    }

    pub fn select_sort(&mut self, key: T::SortKey) {
        self.sort.select(key);
    }

    /// Rows of the current page in display order.
    pub fn view(&self) -> Vec<&T> {
        sort_rows(self.state.rows(), &self.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ranking::{SortDirection, WorkspaceSortKey};
    use crate::models::{PageQuery, WorkspaceRanking};

    fn row(id: &str, chat_count: i64) -> WorkspaceRanking {
        WorkspaceRanking {
            id: id.to_string(),
            name: id.to_string(),
            developer_email: None,
            user_count: 0,
            chat_count,
            message_count: 0,
            positive: 0,
            negative: 0,
        }
    }

    #[test]
    fn failure_keeps_last_good_rows() {
        let mut table = PagedTableState::new(Page::new(vec![1, 2, 3], 3, PageQuery::first(20)));
        table.fail("timeout");
        assert_eq!(table.rows(), &[1, 2, 3]);
        assert_eq!(table.error(), Some("timeout"));

        table.replace(Page::new(vec![4], 4, PageQuery::new(3, 20)));
        assert_eq!(table.rows(), &[4]);
        assert_eq!(table.error(), None);
    }

    #[test]
    fn view_follows_sort_selection() {
        let mut table = RankingTable::new(Page::new(
            vec![row("a", 5), row("b", 20), row("c", 1)],
            3,
            PageQuery::first(20),
        ));
        let order = |t: &RankingTable<WorkspaceRanking>| -> Vec<String> {
            t.view().iter().map(|r| r.id.clone()).collect()
        };

        assert_eq!(order(&table), vec!["b", "a", "c"]);
        table.select_sort(WorkspaceSortKey::ChatCount);
        assert_eq!(table.sort.direction, SortDirection::Ascending);
        assert_eq!(order(&table), vec!["c", "a", "b"]);
    }
}
