//! Ordering of the record list

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::EpisodeRecord;

/// Key the record list is ordered by. Both orders are descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most expensive block first
    #[default]
    Cost,
    /// Most recently written record first
    Recency,
}

impl SortKey {
    /// The other key; what the sort command switches to.
    pub fn toggled(self) -> Self {
        match self {
            SortKey::Cost => SortKey::Recency,
            SortKey::Recency => SortKey::Cost,
        }
    }

    /// Total order: the selected key first, then the other key, then the
    /// start time. Switching keys and back always restores the same order.
    pub fn compare(self, lhs: &EpisodeRecord, rhs: &EpisodeRecord) -> Ordering {
        let by_cost = rhs.duration_ms.cmp(&lhs.duration_ms);
        let by_recency = rhs.backing_file.modified.cmp(&lhs.backing_file.modified);
        let primary = match self {
            SortKey::Cost => by_cost.then(by_recency),
            SortKey::Recency => by_recency.then(by_cost),
        };
        primary.then_with(|| lhs.start_time.cmp(&rhs.start_time))
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Cost => "cost",
            SortKey::Recency => "recency",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cost" | "duration" => Ok(SortKey::Cost),
            "recency" | "time" => Ok(SortKey::Recency),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Stable in-place sort; fully equal records keep their relative order.
pub fn sort_records(records: &mut [EpisodeRecord], key: SortKey) {
    records.sort_by(|a, b| key.compare(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BackingFile;
    use chrono::{TimeZone, Utc};

    fn record(start: &str, duration_ms: i64, modified_secs: u32) -> EpisodeRecord {
        EpisodeRecord {
            start_time: start.to_string(),
            end_time: None,
            duration_ms,
            thread_time_ms: None,
            context: Default::default(),
            stack_entries: Vec::new(),
            backing_file: BackingFile::new(
                format!("/records/{start}.log"),
                Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, modified_secs).unwrap(),
            ),
            stack_summary: String::new(),
        }
    }

    fn starts(records: &[EpisodeRecord]) -> Vec<&str> {
        records.iter().map(|r| r.start_time.as_str()).collect()
    }

    #[test]
    fn test_sort_by_cost_descending() {
        let mut records = vec![record("a", 100, 1), record("b", 500, 2), record("c", 300, 3)];
        sort_records(&mut records, SortKey::Cost);
        assert_eq!(starts(&records), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_recency_descending() {
        let mut records = vec![record("a", 100, 1), record("b", 500, 3), record("c", 300, 2)];
        sort_records(&mut records, SortKey::Recency);
        assert_eq!(starts(&records), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_equal_cost_falls_back_to_recency() {
        let mut records = vec![record("a", 200, 1), record("b", 200, 2), record("c", 900, 3)];
        sort_records(&mut records, SortKey::Cost);
        assert_eq!(starts(&records), vec!["c", "b", "a"]);

        sort_records(&mut records, SortKey::Cost);
        assert_eq!(starts(&records), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_fully_equal_records_keep_relative_order() {
        let mut first = record("x", 200, 1);
        let mut second = record("x", 200, 1);
        first.context.model = Some("first".to_string());
        second.context.model = Some("second".to_string());

        let mut records = vec![first, second];
        sort_records(&mut records, SortKey::Recency);
        assert_eq!(records[0].context.model.as_deref(), Some("first"));
    }

    #[test]
    fn test_switching_key_and_back_restores_order() {
        let mut records = vec![
            record("a", 100, 5),
            record("b", 700, 1),
            record("c", 300, 3),
            record("d", 300, 4),
        ];
        sort_records(&mut records, SortKey::Cost);
        let by_cost = starts(&records).join(",");

        sort_records(&mut records, SortKey::Recency);
        assert_eq!(starts(&records), vec!["a", "d", "c", "b"]);

        sort_records(&mut records, SortKey::Cost);
        assert_eq!(starts(&records).join(","), by_cost);
    }

    #[test]
    fn test_toggle_and_parse() {
        assert_eq!(SortKey::default(), SortKey::Cost);
        assert_eq!(SortKey::Cost.toggled(), SortKey::Recency);
        assert_eq!(SortKey::Recency.toggled(), SortKey::Cost);
        assert_eq!("recency".parse::<SortKey>(), Ok(SortKey::Recency));
        assert_eq!("COST".parse::<SortKey>(), Ok(SortKey::Cost));
        assert!("size".parse::<SortKey>().is_err());
    }
}
