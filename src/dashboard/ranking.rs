use std::cmp::Ordering;
use std::fmt::Debug;

use crate::models::{DeveloperRanking, GroupRanking, WorkspaceRanking};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Rows that carry a signed feedback rating.
pub trait Rated {
    fn rating(&self) -> i64;
}

/// Rows that can be re-ordered on one of a fixed set of numeric columns.
pub trait RankingRow {
    type SortKey: Copy + Eq + Debug;

    fn default_sort_key() -> Self::SortKey;

    fn sort_value(&self, key: Self::SortKey) -> f64;
}

/// Current column and direction of a ranking table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + Eq> SortState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }

    /// Selecting the active column flips direction; any other column starts
    /// descending.
    pub fn select(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = SortDirection::Descending;
        }
    }
}

/// Orders the rows of the current page.
///
/// This only re-orders what was fetched: the server pages by its own fixed
/// order, so sorting page 2 by rating does not surface the best-rated rows of
/// page 3. The sort is stable, ties keep the server order.
pub fn sort_rows<'a, T: RankingRow>(rows: &'a [T], state: &SortState<T::SortKey>) -> Vec<&'a T> {
    let mut sorted: Vec<&T> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        let diff = a.sort_value(state.key) - b.sort_value(state.key);
        let ordering = diff.partial_cmp(&0.0).unwrap_or(Ordering::Equal);
        match state.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeveloperSortKey {
    WorkspaceCount,
    TotalUsers,
    TotalChats,
    TotalMessages,
    Rating,
}

impl Rated for DeveloperRanking {
    fn rating(&self) -> i64 {
        self.total_positive - self.total_negative
    }
}

impl RankingRow for DeveloperRanking {
    type SortKey = DeveloperSortKey;

    fn default_sort_key() -> DeveloperSortKey {
        DeveloperSortKey::TotalChats
    }

    fn sort_value(&self, key: DeveloperSortKey) -> f64 {
        match key {
            DeveloperSortKey::WorkspaceCount => self.workspace_count as f64,
            DeveloperSortKey::TotalUsers => self.total_users as f64,
            DeveloperSortKey::TotalChats => self.total_chats as f64,
            DeveloperSortKey::TotalMessages => self.total_messages as f64,
            DeveloperSortKey::Rating => self.rating() as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceSortKey {
    UserCount,
    ChatCount,
    MessageCount,
    Rating,
}

impl Rated for WorkspaceRanking {
    fn rating(&self) -> i64 {
        self.positive - self.negative
    }
}

impl RankingRow for WorkspaceRanking {
    type SortKey = WorkspaceSortKey;

    fn default_sort_key() -> WorkspaceSortKey {
        WorkspaceSortKey::ChatCount
    }

    fn sort_value(&self, key: WorkspaceSortKey) -> f64 {
        match key {
            WorkspaceSortKey::UserCount => self.user_count as f64,
            WorkspaceSortKey::ChatCount => self.chat_count as f64,
            WorkspaceSortKey::MessageCount => self.message_count as f64,
            WorkspaceSortKey::Rating => self.rating() as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSortKey {
    MemberCount,
    TotalChats,
    TotalMessages,
    TotalFeedbacks,
    ChatsPerMember,
    MessagesPerMember,
}

impl RankingRow for GroupRanking {
    type SortKey = GroupSortKey;

    fn default_sort_key() -> GroupSortKey {
        GroupSortKey::ChatsPerMember
    }

    fn sort_value(&self, key: GroupSortKey) -> f64 {
        match key {
            GroupSortKey::MemberCount => self.member_count as f64,
            GroupSortKey::TotalChats => self.total_chats as f64,
            GroupSortKey::TotalMessages => self.total_messages as f64,
            GroupSortKey::TotalFeedbacks => self.total_feedbacks as f64,
            GroupSortKey::ChatsPerMember => self.chats_per_member,
            GroupSortKey::MessagesPerMember => self.messages_per_member,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(id: &str, chat_count: i64, positive: i64, negative: i64) -> WorkspaceRanking {
        WorkspaceRanking {
            id: id.to_string(),
            name: id.to_uppercase(),
            developer_email: Some(format!("{id}@samsung.com")),
            user_count: 1,
            chat_count,
            message_count: chat_count * 4,
            positive,
            negative,
        }
    }

    fn ids(rows: &[&WorkspaceRanking]) -> Vec<String> {
        rows.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn rating_is_positive_minus_negative() {
        assert_eq!(workspace("a", 1, 12, 3).rating(), 9);
        assert_eq!(workspace("b", 1, 2, 7).rating(), -5);

        let dev = DeveloperRanking {
            user_id: "u1".to_string(),
            user_name: None,
            email: None,
            workspace_count: 2,
            total_users: 5,
            total_chats: 10,
            total_messages: 40,
            total_positive: 0,
            total_negative: 4,
        };
        assert_eq!(dev.rating(), -4);
        assert_eq!(dev.rating(), dev.rating());
    }

    #[test]
    fn repeated_selection_toggles_direction() {
        let rows = vec![workspace("a", 5, 0, 0), workspace("b", 20, 0, 0), workspace("c", 1, 0, 0)];
        let mut state = SortState::new(WorkspaceSortKey::ChatCount);

        assert_eq!(ids(&sort_rows(&rows, &state)), vec!["b", "a", "c"]);

        state.select(WorkspaceSortKey::ChatCount);
        assert_eq!(state.direction, SortDirection::Ascending);
        assert_eq!(ids(&sort_rows(&rows, &state)), vec!["c", "a", "b"]);
    }

    #[test]
    fn new_key_resets_to_descending() {
        let mut state = SortState::new(WorkspaceSortKey::ChatCount);
        state.select(WorkspaceSortKey::ChatCount);
        assert_eq!(state.direction, SortDirection::Ascending);

        state.select(WorkspaceSortKey::Rating);
        assert_eq!(state.key, WorkspaceSortKey::Rating);
        assert_eq!(state.direction, SortDirection::Descending);
    }

    #[test]
    fn sorts_by_derived_rating() {
        let rows = vec![workspace("a", 1, 3, 5), workspace("b", 1, 9, 1), workspace("c", 1, 0, 0)];
        let state = SortState::new(WorkspaceSortKey::Rating);
        assert_eq!(ids(&sort_rows(&rows, &state)), vec!["b", "c", "a"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let rows = vec![
            workspace("first", 7, 0, 0),
            workspace("top", 9, 0, 0),
            workspace("second", 7, 0, 0),
            workspace("third", 7, 0, 0),
        ];
        let mut state = SortState::new(WorkspaceSortKey::ChatCount);
        assert_eq!(ids(&sort_rows(&rows, &state)), vec!["top", "first", "second", "third"]);

        state.select(WorkspaceSortKey::ChatCount);
        assert_eq!(ids(&sort_rows(&rows, &state)), vec!["first", "second", "third", "top"]);
    }

    #[test]
    fn groups_sort_on_fractional_per_member_values() {
        let group = |id: &str, per_member: f64| GroupRanking {
            group_id: id.to_string(),
            group_name: id.to_string(),
            member_count: 3,
            total_chats: 0,
            total_messages: 0,
            total_feedbacks: 0,
            chats_per_member: per_member,
            messages_per_member: 0.0,
        };
        let rows = vec![group("a", 1.2), group("b", 1.25), group("c", 0.4)];
        let state = SortState::new(GroupRanking::default_sort_key());
        let order: Vec<&str> = sort_rows(&rows, &state)
            .iter()
            .map(|g| g.group_id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn sorting_leaves_input_untouched() {
        let rows = vec![workspace("a", 1, 0, 0), workspace("b", 2, 0, 0)];
        let _ = sort_rows(&rows, &SortState::new(WorkspaceSortKey::ChatCount));
        assert_eq!(rows[0].id, "a");
    }
}
