//! Civil-date helpers. The dashboard reports days in Korea Standard Time
//! (UTC+9, no DST) regardless of where the server or the browser runs.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::models::DateRange;

const KST_OFFSET_SECS: i64 = 9 * 3600;

pub fn today_kst(now: DateTime<Utc>) -> NaiveDate {
    (now.naive_utc() + TimeDelta::seconds(KST_OFFSET_SECS)).date()
}

/// Window of `days` days ending on `last` (inclusive).
pub fn trailing_window(last: NaiveDate, days: u64) -> DateRange {
    let span = days.saturating_sub(1);
    let from = last.checked_sub_days(Days::new(span)).unwrap_or(last);
    DateRange::new(from, last)
}

/// Range the dashboard opens with: the 7 days ending yesterday.
pub fn default_client_range(now: DateTime<Utc>) -> DateRange {
    let today = today_kst(now);
    let yesterday = today.pred_opt().unwrap_or(today);
    trailing_window(yesterday, 7)
}

/// Range the API falls back to when `from`/`to` are omitted: 30 days ending today.
pub fn default_server_range(now: DateTime<Utc>) -> DateRange {
    trailing_window(today_kst(now), 30)
}

/// Half-open epoch-second bounds `[start of from, start of to + 1)` in KST.
pub fn epoch_bounds(range: DateRange) -> (i64, i64) {
    let start = midnight_kst(range.from);
    let end_day = range.to.succ_opt().unwrap_or(range.to);
    (start, midnight_kst(end_day))
}

fn midnight_kst(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp() - KST_OFFSET_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn kst_rolls_over_before_utc() {
        // 16:30 UTC on May 1st is already May 2nd in Seoul.
        assert_eq!(today_kst(utc("2024-05-01T16:30:00Z")), day(2024, 5, 2));
        assert_eq!(today_kst(utc("2024-05-01T14:59:59Z")), day(2024, 5, 1));
    }

    #[test]
    fn client_range_is_seven_days_ending_yesterday() {
        let range = default_client_range(utc("2024-05-01T16:30:00Z"));
        assert_eq!(range.to, day(2024, 5, 1));
        assert_eq!(range.from, day(2024, 4, 25));
        assert_eq!(range.len_days(), 7);
    }

    #[test]
    fn server_range_covers_thirty_days() {
        let range = default_server_range(utc("2024-03-01T00:00:00Z"));
        assert_eq!(range.to, day(2024, 3, 1));
        assert_eq!(range.from, day(2024, 1, 31));
        assert_eq!(range.len_days(), 30);
    }

    #[test]
    fn epoch_bounds_use_kst_midnight() {
        let (start, end) = epoch_bounds(DateRange::new(day(2024, 5, 1), day(2024, 5, 1)));
        // 2024-05-01T00:00+09:00 == 2024-04-30T15:00Z
        assert_eq!(start, utc("2024-04-30T15:00:00Z").timestamp());
        assert_eq!(end - start, 86_400);
    }
}
