//! Progress ledger: completed work sessions per calendar day.
//!
//! The whole ledger is one JSON blob under [`PROGRESS_KEY`], so a write is
//! atomic by construction. Mutations are computed on a copy and only become
//! visible in memory once the write succeeded.
//!
//! Date-keys are ISO dates (`2024-01-01`). Blobs written by the older
//! browser build used `Mon Jan 01 2024` keys and camelCase field names; both
//! are still accepted on load and normalized.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::storage::{load_or_default, KvStore, PROGRESS_KEY};

/// Persisted progress data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    #[serde(alias = "daily", deserialize_with = "deserialize_daily_counts")]
    pub daily_counts: BTreeMap<NaiveDate, u32>,
    pub total: u32,
    pub streak: u32,
    #[serde(alias = "lastDate", deserialize_with = "deserialize_opt_date_key")]
    pub last_completion_date: Option<NaiveDate>,
}

impl ProgressRecord {
    /// Count one completed work session on `date` and update the streak.
    pub fn apply_completion(&mut self, date: NaiveDate) {
        let count = self.daily_counts.entry(date).or_insert(0);
        *count = count.saturating_add(1);
        self.total = self.total.saturating_add(1);

        // Decided against the previous completion date, before it is overwritten.
        self.streak = match self.last_completion_date {
            Some(last) if last == date => self.streak,
            Some(last) if last.succ_opt() == Some(date) => self.streak.saturating_add(1),
            _ => 1,
        };
        self.last_completion_date = Some(date);
    }

    /// Sum of every daily count.
    pub fn counted_total(&self) -> u32 {
        self.daily_counts
            .values()
            .fold(0u32, |acc, n| acc.saturating_add(*n))
    }

    /// Days with at least one completion.
    pub fn active_days(&self) -> usize {
        self.daily_counts.values().filter(|n| **n > 0).count()
    }
}

/// One point of the seven-day chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u32,
}

impl DayCount {
    /// Chart axis label, e.g. `Mon, Jan 1`.
    pub fn label(&self) -> String {
        self.date.format("%a, %b %-d").to_string()
    }
}

/// Headline numbers for the stats views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub today: NaiveDate,
    pub today_count: u32,
    pub total: u32,
    pub streak: u32,
    pub average_per_active_day: f64,
}

/// Durable progress ledger bound to a [`KvStore`].
pub struct ProgressLedger<S> {
    store: S,
    record: ProgressRecord,
}

impl<S: KvStore> ProgressLedger<S> {
    /// Load the ledger from `store`, starting empty if nothing usable is there.
    pub fn load(store: S) -> Self {
        let mut record: ProgressRecord = load_or_default(&store, PROGRESS_KEY);
        let counted = record.counted_total();
        if record.total != counted {
            warn!(
                stored = record.total,
                counted, "progress total disagrees with daily counts; using the counted sum"
            );
            record.total = counted;
        }
        Self { store, record }
    }

    /// Record one completed work session on `date` and persist.
    ///
    /// # Errors
    /// Returns the storage error if the write fails; the ledger is unchanged.
    pub fn record_completion(&mut self, date: NaiveDate) -> Result<()> {
        let mut next = self.record.clone();
        next.apply_completion(date);
        let json = serde_json::to_string(&next)?;
        self.store.save(PROGRESS_KEY, &json)?;
        self.record = next;
        info!(
            %date,
            today = self.today_count(date),
            total = self.record.total,
            streak = self.record.streak,
            "work session recorded"
        );
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn today_count(&self, today: NaiveDate) -> u32 {
        self.record.daily_counts.get(&today).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.record.total
    }

    pub fn streak(&self) -> u32 {
        self.record.streak
    }

    pub fn last_completion_date(&self) -> Option<NaiveDate> {
        self.record.last_completion_date
    }

    /// Completions per active day, rounded to one decimal.
    pub fn average_per_active_day(&self) -> f64 {
        let days = self.record.active_days().max(1) as f64;
        (f64::from(self.record.total) / days * 10.0).round() / 10.0
    }

    /// Counts for the seven days ending with `today`, oldest first.
    pub fn last_7_days_series(&self, today: NaiveDate) -> Vec<DayCount> {
        (0..7u64)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|date| DayCount {
                date,
                count: self.today_count(date),
            })
            .collect()
    }

    pub fn summary(&self, today: NaiveDate) -> ProgressSummary {
        ProgressSummary {
            today,
            today_count: self.today_count(today),
            total: self.total(),
            streak: self.streak(),
            average_per_active_day: self.average_per_active_day(),
        }
    }
}

/// Parse a date-key in ISO form or the legacy `Mon Jan 01 2024` form.
pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%a %b %d %Y"))
        .ok()
}

fn deserialize_daily_counts<'de, D>(deserializer: D) -> Result<BTreeMap<NaiveDate, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, u32>::deserialize(deserializer)?;
    let mut counts = BTreeMap::new();
    for (key, count) in raw {
        let date = parse_date_key(&key)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date key '{key}'")))?;
        let entry = counts.entry(date).or_insert(0u32);
        *entry = entry.saturating_add(count);
    }
    Ok(counts)
}

fn deserialize_opt_date_key<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(key) => parse_date_key(&key)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date key '{key}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, StorageError};
    use crate::storage::MemoryStore;

    fn d(s: &str) -> NaiveDate {
        parse_date_key(s).unwrap()
    }

    #[test]
    fn first_completion_starts_streak() {
        let mut ledger = ProgressLedger::load(MemoryStore::new());
        ledger.record_completion(d("2024-01-01")).unwrap();
        assert_eq!(ledger.total(), 1);
        assert_eq!(ledger.streak(), 1);
        assert_eq!(ledger.today_count(d("2024-01-01")), 1);
        assert_eq!(ledger.last_completion_date(), Some(d("2024-01-01")));
    }

    #[test]
    fn same_day_and_next_day_scenario() {
        let mut ledger = ProgressLedger::load(MemoryStore::new());
        ledger.record_completion(d("2024-01-01")).unwrap();
        ledger.record_completion(d("2024-01-02")).unwrap();
        assert_eq!(ledger.streak(), 2);
        assert_eq!(ledger.total(), 2);

        ledger.record_completion(d("2024-01-02")).unwrap();
        assert_eq!(ledger.streak(), 2);
        assert_eq!(ledger.total(), 3);
        assert_eq!(ledger.today_count(d("2024-01-02")), 2);
        assert_eq!(ledger.today_count(d("2024-01-01")), 1);
    }

    #[test]
    fn gap_resets_streak() {
        let mut record = ProgressRecord::default();
        record.apply_completion(d("2024-01-01"));
        record.apply_completion(d("2024-01-02"));
        record.apply_completion(d("2024-01-03"));
        assert_eq!(record.streak, 3);

        record.apply_completion(d("2024-01-06"));
        assert_eq!(record.streak, 1);
    }

    #[test]
    fn streak_crosses_month_and_year() {
        let mut record = ProgressRecord::default();
        record.apply_completion(d("2023-12-31"));
        record.apply_completion(d("2024-01-01"));
        assert_eq!(record.streak, 2);

        let mut leap = ProgressRecord::default();
        leap.apply_completion(d("2024-02-28"));
        leap.apply_completion(d("2024-02-29"));
        leap.apply_completion(d("2024-03-01"));
        assert_eq!(leap.streak, 3);
    }

    #[test]
    fn earlier_date_resets_streak() {
        let mut record = ProgressRecord::default();
        record.apply_completion(d("2024-01-05"));
        record.apply_completion(d("2024-01-06"));
        record.apply_completion(d("2024-01-04"));
        assert_eq!(record.streak, 1);
        assert_eq!(record.last_completion_date, Some(d("2024-01-04")));
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let mut ledger = ProgressLedger::load(MemoryStore::new());
        assert_eq!(ledger.average_per_active_day(), 0.0);

        for _ in 0..3 {
            ledger.record_completion(d("2024-01-01")).unwrap();
        }
        ledger.record_completion(d("2024-01-02")).unwrap();
        ledger.record_completion(d("2024-01-04")).unwrap();
        // 5 / 3 = 1.666..
        assert_eq!(ledger.average_per_active_day(), 1.7);
    }

    #[test]
    fn seven_day_series_is_oldest_first_and_zero_filled() {
        let mut ledger = ProgressLedger::load(MemoryStore::new());
        ledger.record_completion(d("2024-01-01")).unwrap();
        ledger.record_completion(d("2024-01-07")).unwrap();
        ledger.record_completion(d("2024-01-07")).unwrap();

        let series = ledger.last_7_days_series(d("2024-01-07"));
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, d("2024-01-01"));
        assert_eq!(series[6].date, d("2024-01-07"));
        let counts: Vec<u32> = series.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn series_label_format() {
        let point = DayCount {
            date: d("2024-01-01"),
            count: 0,
        };
        assert_eq!(point.label(), "Mon, Jan 1");
    }

    #[test]
    fn record_roundtrips_through_json() {
        let mut record = ProgressRecord::default();
        record.apply_completion(d("2024-01-01"));
        record.apply_completion(d("2024-01-02"));
        record.apply_completion(d("2024-01-02"));

        let json = serde_json::to_string(&record).unwrap();
        let parsed: ProgressRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert!(json.contains("\"2024-01-02\":2"));
    }

    #[test]
    fn reload_from_store() {
        let store = MemoryStore::new();
        {
            let mut ledger = ProgressLedger::load(&store);
            ledger.record_completion(d("2024-01-01")).unwrap();
            ledger.record_completion(d("2024-01-02")).unwrap();
        }
        let ledger = ProgressLedger::load(&store);
        assert_eq!(ledger.total(), 2);
        assert_eq!(ledger.streak(), 2);
        assert_eq!(ledger.last_completion_date(), Some(d("2024-01-02")));
    }

    #[test]
    fn legacy_blob_is_normalized() {
        let store = MemoryStore::new();
        store
            .save(
                PROGRESS_KEY,
                r#"{"daily":{"Mon Jan 01 2024":2,"Tue Jan 02 2024":1},"total":3,"streak":2,"lastDate":"Tue Jan 02 2024"}"#,
            )
            .unwrap();
        let mut ledger = ProgressLedger::load(&store);
        assert_eq!(ledger.total(), 3);
        assert_eq!(ledger.today_count(d("2024-01-01")), 2);
        assert_eq!(ledger.last_completion_date(), Some(d("2024-01-02")));

        ledger.record_completion(d("2024-01-03")).unwrap();
        assert_eq!(ledger.streak(), 3);
    }

    #[test]
    fn malformed_blob_starts_empty() {
        let store = MemoryStore::new();
        store.save(PROGRESS_KEY, "[1, 2, 3").unwrap();
        let ledger = ProgressLedger::load(&store);
        assert_eq!(ledger.record(), &ProgressRecord::default());

        store
            .save(PROGRESS_KEY, r#"{"daily_counts":{"yesterday":1}}"#)
            .unwrap();
        let ledger = ProgressLedger::load(&store);
        assert_eq!(ledger.total(), 0);
    }

    #[test]
    fn mismatched_total_is_recounted() {
        let store = MemoryStore::new();
        store
            .save(
                PROGRESS_KEY,
                r#"{"daily_counts":{"2024-01-01":2},"total":9,"streak":1,"last_completion_date":"2024-01-01"}"#,
            )
            .unwrap();
        let ledger = ProgressLedger::load(&store);
        assert_eq!(ledger.total(), 2);
    }

    #[test]
    fn date_key_parsing() {
        assert_eq!(parse_date_key("2024-03-09"), parse_date_key("Sat Mar 09 2024"));
        assert!(parse_date_key("09/03/2024").is_none());
        assert!(parse_date_key("").is_none());
    }

    #[test]
    fn saturated_day_count_stays_consistent() {
        let store = MemoryStore::new();
        store
            .save(
                PROGRESS_KEY,
                r#"{"daily_counts":{"2024-01-01":4294967295},"total":4294967295,"streak":1,"last_completion_date":"2024-01-01"}"#,
            )
            .unwrap();
        let mut ledger = ProgressLedger::load(&store);
        ledger.record_completion(d("2024-01-01")).unwrap();
        assert_eq!(ledger.today_count(d("2024-01-01")), u32::MAX);
        assert_eq!(ledger.total(), ledger.record().counted_total());
    }

    #[test]
    fn duplicate_legacy_keys_saturate() {
        let json = r#"{"daily_counts":{"2024-01-01":4294967295,"Mon Jan 01 2024":5}}"#;
        let record: ProgressRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.daily_counts[&d("2024-01-01")], u32::MAX);
    }

    struct ReadOnlyStore(MemoryStore);

    impl KvStore for ReadOnlyStore {
        fn load(&self, key: &str) -> Result<Option<String>> {
            self.0.load(key)
        }

        fn save(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CoreError::Storage(StorageError::Locked))
        }

        fn save_all(&self, _entries: &[(&str, &str)]) -> Result<()> {
            Err(CoreError::Storage(StorageError::Locked))
        }
    }

    #[test]
    fn failed_write_leaves_ledger_unchanged() {
        let inner = MemoryStore::new();
        inner
            .save(
                PROGRESS_KEY,
                r#"{"daily_counts":{"2024-01-01":2},"total":2,"streak":1,"last_completion_date":"2024-01-01"}"#,
            )
            .unwrap();
        let mut ledger = ProgressLedger::load(ReadOnlyStore(inner));
        let before = ledger.record().clone();

        let err = ledger.record_completion(d("2024-01-02")).unwrap_err();
        assert!(matches!(err, CoreError::Storage(StorageError::Locked)));
        assert_eq!(ledger.record(), &before);
        assert_eq!(ledger.streak(), 1);
        assert_eq!(ledger.today_count(d("2024-01-02")), 0);
    }
}
