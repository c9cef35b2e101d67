//! Aggregate statistics derived from the record set. Recomputed on demand.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Status, UserRecord};
use crate::report::DateRange;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: String,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_users: usize,
    pub active_users: usize,
    pub inactive_users: usize,
    pub new_users_this_month: usize,
    /// Always 12 entries, January first.
    pub users_by_month: Vec<MonthCount>,
}

impl AggregateStats {
    /// Counts over `records`. The histogram buckets records by calendar month
    /// of `created_at`, across years.
    pub fn compute(records: &[UserRecord], today: NaiveDate) -> Self {
        let mut buckets = [0u32; 12];
        for r in records {
            buckets[r.created_at.month0() as usize] += 1;
        }
        let active_users = records.iter().filter(|r| r.status == Status::Active).count();
        let new_users_this_month = records
            .iter()
            .filter(|r| DateRange::ThisMonth.contains(r.created_at, today))
            .count();
        Self {
            total_users: records.len(),
            active_users,
            inactive_users: records.len() - active_users,
            new_users_this_month,
            users_by_month: MONTHS
                .iter()
                .zip(buckets)
                .map(|(m, count)| MonthCount {
                    month: (*m).to_string(),
                    count,
                })
                .collect(),
        }
    }

    /// Bring a histogram received from elsewhere into canonical shape:
    /// 12 months in calendar order, missing months as zero.
    pub fn normalized(mut self) -> Self {
        let counts = MONTHS
            .iter()
            .map(|m| {
                let count = self
                    .users_by_month
                    .iter()
                    .filter(|mc| mc.month.eq_ignore_ascii_case(m))
                    .map(|mc| mc.count)
                    .sum();
                MonthCount {
                    month: (*m).to_string(),
                    count,
                }
            })
            .collect();
        self.users_by_month = counts;
        self
    }

    /// Histogram as `(label, value)` pairs for bar charts.
    pub fn month_bars(&self) -> Vec<(&str, u64)> {
        self.users_by_month
            .iter()
            .map(|mc| (mc.month.as_str(), u64::from(mc.count)))
            .collect()
    }

    /// Share of active users in percent, 0 for an empty set.
    pub fn active_percent(&self) -> u16 {
        if self.total_users == 0 {
            0
        } else {
            ((self.active_users * 100) / self.total_users) as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::demo_records;

    #[test]
    fn demo_stats_match_known_figures() {
        let today = NaiveDate::from_ymd_opt(2023, 7, 31).unwrap();
        let s = AggregateStats::compute(&demo_records(), today);
        assert_eq!(s.total_users, 7);
        assert_eq!(s.active_users, 5);
        assert_eq!(s.inactive_users, 2);
        assert_eq!(s.new_users_this_month, 1);
        let counts: Vec<u32> = s.users_by_month.iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(s.users_by_month[0].month, "Jan");
        assert_eq!(s.active_percent(), 71);
    }

    #[test]
    fn empty_set_is_all_zero() {
        let s = AggregateStats::compute(&[], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(s.total_users, 0);
        assert_eq!(s.users_by_month.len(), 12);
        assert_eq!(s.active_percent(), 0);
    }

    #[test]
    fn normalized_zero_fills_and_orders() {
        let s = AggregateStats {
            total_users: 3,
            active_users: 3,
            inactive_users: 0,
            new_users_this_month: 0,
            users_by_month: vec![
                MonthCount { month: "Mar".into(), count: 2 },
                MonthCount { month: "jan".into(), count: 1 },
            ],
        }
        .normalized();
        let counts: Vec<u32> = s.users_by_month.iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![1, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let s = AggregateStats::compute(&demo_records(), NaiveDate::from_ymd_opt(2023, 7, 31).unwrap());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["totalUsers"], 7);
        assert_eq!(v["newUsersThisMonth"], 1);
        assert_eq!(v["usersByMonth"][0]["month"], "Jan");
    }
}
