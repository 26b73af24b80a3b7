use crate::models::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Previous,
    Next,
}

/// Offset/limit navigation for one table. Pure arithmetic: it hands the new
/// offset back to the caller and never fetches anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    total: u64,
    offset: u64,
    limit: u64,
}

impl Pagination {
    pub fn new(total: u64, offset: u64, limit: u64) -> Self {
        Self {
            total,
            offset,
            limit: limit.max(1),
        }
    }

    pub fn from_page<T>(page: &Page<T>) -> Self {
        Self::new(
            page.total.max(0) as u64,
            page.offset.max(0) as u64,
            page.limit.max(1) as u64,
        )
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn current_page(&self) -> u64 {
        self.offset / self.limit + 1
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit)
    }

    /// 1-based inclusive row range shown on this page, `None` past the end.
    pub fn visible_range(&self) -> Option<(u64, u64)> {
        if self.offset >= self.total {
            return None;
        }
        Some((self.offset + 1, (self.offset + self.limit).min(self.total)))
    }

    /// A single page needs no controls at all.
    pub fn is_needed(&self) -> bool {
        self.total > self.limit
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.limit < self.total
    }

    pub fn previous(&self) -> Option<u64> {
        self.has_previous()
            .then(|| self.offset.saturating_sub(self.limit))
    }

    pub fn next(&self) -> Option<u64> {
        self.has_next().then(|| self.offset + self.limit)
    }

    pub fn apply(&self, action: PageAction) -> Option<u64> {
        match action {
            PageAction::Previous => self.previous(),
            PageAction::Next => self.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageQuery;

    #[test]
    fn middle_page_of_three() {
        let p = Pagination::new(45, 20, 20);
        assert_eq!(p.current_page(), 2);
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.visible_range(), Some((21, 40)));
        assert!(p.has_next());
        assert!(p.has_previous());
        assert_eq!(p.next(), Some(40));
        assert_eq!(p.previous(), Some(0));
    }

    #[test]
    fn last_page_disables_next() {
        let p = Pagination::new(45, 40, 20);
        assert_eq!(p.current_page(), 3);
        assert_eq!(p.visible_range(), Some((41, 45)));
        assert!(!p.has_next());
        assert_eq!(p.apply(PageAction::Next), None);
        assert_eq!(p.apply(PageAction::Previous), Some(20));
    }

    #[test]
    fn first_page_disables_previous() {
        let p = Pagination::new(45, 0, 20);
        assert!(!p.has_previous());
        assert_eq!(p.apply(PageAction::Previous), None);
        assert_eq!(p.visible_range(), Some((1, 20)));
    }

    #[test]
    fn single_page_renders_nothing() {
        assert!(!Pagination::new(15, 0, 20).is_needed());
        assert!(!Pagination::new(20, 0, 20).is_needed());
        assert!(Pagination::new(21, 0, 20).is_needed());
    }

    #[test]
    fn previous_clamps_unaligned_offset_to_zero() {
        let p = Pagination::new(45, 5, 20);
        assert_eq!(p.previous(), Some(0));
    }

    #[test]
    fn empty_result_has_no_range() {
        let p = Pagination::new(0, 0, 20);
        assert_eq!(p.visible_range(), None);
        assert_eq!(p.total_pages(), 0);
        assert!(!p.has_next());
    }

    #[test]
    fn reads_state_from_page() {
        let page: Page<u8> = Page::new(vec![1, 2, 3, 4, 5], 45, PageQuery::new(40, 20));
        let p = Pagination::from_page(&page);
        assert_eq!(p.visible_range(), Some((41, 45)));
        assert_eq!(p.limit(), 20);
    }
}
