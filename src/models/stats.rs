use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Aggregate counters shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Overview {
    pub total_chats: i64,
    pub total_messages: i64,
    pub total_models: i64,
    pub total_feedbacks: i64,
    pub total_tools: i64,
    pub total_functions: i64,
}

/// One point of the activity time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub chat_count: i64,
    pub message_count: i64,
    pub user_count: i64,
}

impl DailyStat {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            chat_count: 0,
            message_count: 0,
            user_count: 0,
        }
    }
}

/// Inclusive civil-date window, serialized as `from=YYYY-MM-DD&to=YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn is_ordered(&self) -> bool {
        self.from <= self.to
    }

    /// Number of days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |day| *day <= to)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DailyStatsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_iterates_inclusive_days() {
        let range = DateRange::new(day(2024, 2, 27), day(2024, 3, 1));
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(range.len_days(), 4);
        assert_eq!(days[2], day(2024, 2, 29));
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = DateRange::new(day(2024, 5, 2), day(2024, 5, 1));
        assert!(!range.is_ordered());
        assert_eq!(range.days().count(), 0);
    }

    #[test]
    fn daily_stat_serializes_iso_date() {
        let json = serde_json::to_value(DailyStat::zero(day(2024, 5, 1))).unwrap();
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["chat_count"], 0);
    }
}
