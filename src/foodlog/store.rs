use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::StoreError;
use crate::storage::BlobStore;

use super::entry::FoodLogEntry;

const DATE_INDEX_KEY: &str = "food_log_dates";
const ENTRY_INDEX_KEY: &str = "food_log_entry_dates";

fn partition_key(date: &str) -> String {
    format!("food_logs_{date}")
}

/// Date-partitioned food log over a [`BlobStore`].
///
/// Two indexes ride along with the partitions: `food_log_dates`, the sorted
/// list of dates holding at least one entry, and `food_log_entry_dates`,
/// an id-to-date map that makes deletes a single partition read instead of
/// a scan. Writes to one date are serialized through a per-date mutex,
/// index writes through their own; partition locks are always taken before
/// the index lock.
#[derive(Clone)]
pub struct FoodLogStore {
    store: Arc<dyn BlobStore>,
    date_locks: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
    index_lock: Arc<Mutex<()>>,
}

impl FoodLogStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            date_locks: Arc::new(StdMutex::new(HashMap::new())),
            index_lock: Arc::new(Mutex::new(())),
        }
    }

    fn date_lock(&self, date: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .date_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(date.to_string()).or_default().clone()
    }

    /// Reads a JSON blob; a missing key or unreadable payload degrades to
    /// the default value with a warning, never an error.
    async fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match self.store.get(key).await? {
            None => Ok(T::default()),
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "unreadable blob, treating as empty");
                T::default()
            })),
        }
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let blob = serde_json::to_string(value).map_err(|e| StoreError::Storage(e.into()))?;
        self.store.set(key, &blob).await?;
        Ok(())
    }

    /// The day's entries; empty when the date is absent or its blob is
    /// corrupt.
    pub async fn entries_for_date(&self, date: &str) -> Result<Vec<FoodLogEntry>, StoreError> {
        self.read_json(&partition_key(date)).await
    }

    /// Inserts the entry into its date partition, replacing any existing
    /// entry with the same id. When an edited timestamp moves the entry to
    /// another day, the old copy is removed first so the id never exists
    /// in two partitions.
    pub async fn save(&self, entry: &FoodLogEntry) -> Result<(), StoreError> {
        if entry.id.trim().is_empty() {
            return Err(StoreError::Validation("entry id must not be empty".into()));
        }
        let date = entry.log_date();

        let previous: BTreeMap<String, String> = self.read_json(ENTRY_INDEX_KEY).await?;
        if let Some(old_date) = previous.get(&entry.id) {
            if old_date != &date {
                self.remove_from_date(old_date, &entry.id).await?;
            }
        }

        let lock = self.date_lock(&date);
        let _guard = lock.lock().await;
        let key = partition_key(&date);
        let mut entries: Vec<FoodLogEntry> = self.read_json(&key).await?;
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => *slot = entry.clone(),
            None => entries.push(entry.clone()),
        }
        self.write_json(&key, &entries).await?;
        self.index_insert(&date, &entry.id).await
    }

    /// Removes the entry wherever it lives. Unknown ids are a no-op, not
    /// an error.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let index: BTreeMap<String, String> = self.read_json(ENTRY_INDEX_KEY).await?;
        if let Some(date) = index.get(id) {
            if self.remove_from_date(date, id).await? {
                return Ok(());
            }
            // stale mapping, fall back to the scan
        }
        for date in self.read_dates().await? {
            if self.remove_from_date(&date, id).await? {
                return Ok(());
            }
        }
        self.index_remove_id(id).await
    }

    /// Entries for every non-empty date in `[start, end]` inclusive.
    pub async fn entries_for_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<BTreeMap<String, Vec<FoodLogEntry>>, StoreError> {
        let mut out = BTreeMap::new();
        for date in self.read_dates().await? {
            if date.as_str() < start {
                continue;
            }
            if date.as_str() > end {
                break;
            }
            let entries = self.entries_for_date(&date).await?;
            if !entries.is_empty() {
                out.insert(date, entries);
            }
        }
        Ok(out)
    }

    /// Dates with at least one entry, sorted ascending.
    pub async fn read_dates(&self) -> Result<Vec<String>, StoreError> {
        self.read_json(DATE_INDEX_KEY).await
    }

    async fn remove_from_date(&self, date: &str, id: &str) -> Result<bool, StoreError> {
        let lock = self.date_lock(date);
        let _guard = lock.lock().await;
        let key = partition_key(date);
        let mut entries: Vec<FoodLogEntry> = self.read_json(&key).await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        if entries.is_empty() {
            self.store.remove(&key).await?;
            self.index_remove_date(date).await?;
        } else {
            self.write_json(&key, &entries).await?;
        }
        self.index_remove_id(id).await?;
        Ok(true)
    }

    async fn index_insert(&self, date: &str, id: &str) -> Result<(), StoreError> {
        let _guard = self.index_lock.lock().await;
        let mut dates: Vec<String> = self.read_json(DATE_INDEX_KEY).await?;
        if let Err(pos) = dates.binary_search_by(|d| d.as_str().cmp(date)) {
            dates.insert(pos, date.to_string());
            self.write_json(DATE_INDEX_KEY, &dates).await?;
        }
        let mut ids: BTreeMap<String, String> = self.read_json(ENTRY_INDEX_KEY).await?;
        if ids.get(id).map(String::as_str) != Some(date) {
            ids.insert(id.to_string(), date.to_string());
            self.write_json(ENTRY_INDEX_KEY, &ids).await?;
        }
        Ok(())
    }

    async fn index_remove_date(&self, date: &str) -> Result<(), StoreError> {
        let _guard = self.index_lock.lock().await;
        let mut dates: Vec<String> = self.read_json(DATE_INDEX_KEY).await?;
        if let Ok(pos) = dates.binary_search_by(|d| d.as_str().cmp(date)) {
            dates.remove(pos);
            self.write_json(DATE_INDEX_KEY, &dates).await?;
        }
        Ok(())
    }

    async fn index_remove_id(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.index_lock.lock().await;
        let mut ids: BTreeMap<String, String> = self.read_json(ENTRY_INDEX_KEY).await?;
        if ids.remove(id).is_some() {
            self.write_json(ENTRY_INDEX_KEY, &ids).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foodlog::entry::MealType;
    use crate::storage::MemoryBlobStore;
    use time::macros::datetime;
    use time::OffsetDateTime;

    fn store() -> FoodLogStore {
        FoodLogStore::new(Arc::new(MemoryBlobStore::default()))
    }

    fn entry(id: &str, timestamp: OffsetDateTime, calories: f64) -> FoodLogEntry {
        FoodLogEntry {
            id: id.into(),
            name: format!("food-{id}"),
            calories,
            protein: 20.0,
            carbs: 30.0,
            fat: 10.0,
            fiber: 0.0,
            sugar: 0.0,
            meal_type: MealType::Breakfast,
            timestamp,
        }
    }

    /// The DateIndex invariant: a date is present iff its partition is
    /// non-empty.
    async fn assert_index_consistent(log: &FoodLogStore) {
        let dates = log.read_dates().await.expect("read dates");
        for date in &dates {
            let entries = log.entries_for_date(date).await.expect("read partition");
            assert!(!entries.is_empty(), "index lists empty date {date}");
        }
    }

    #[tokio::test]
    async fn save_then_read_then_delete_roundtrip() {
        let log = store();
        let e = entry("a", datetime!(2024-01-01 08:00 UTC), 300.0);
        log.save(&e).await.expect("save");

        let day = log.entries_for_date("2024-01-01").await.expect("read");
        assert_eq!(day, vec![e]);
        assert_eq!(log.read_dates().await.expect("dates"), vec!["2024-01-01"]);

        log.delete("a").await.expect("delete");
        assert!(log.entries_for_date("2024-01-01").await.expect("read").is_empty());
        assert!(log.read_dates().await.expect("dates").is_empty());
        assert_index_consistent(&log).await;
    }

    #[tokio::test]
    async fn save_same_id_replaces_not_appends() {
        let log = store();
        log.save(&entry("a", datetime!(2024-01-01 08:00 UTC), 300.0))
            .await
            .expect("save");
        log.save(&entry("a", datetime!(2024-01-01 12:00 UTC), 450.0))
            .await
            .expect("save again");

        let day = log.entries_for_date("2024-01-01").await.expect("read");
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].calories, 450.0);
    }

    #[tokio::test]
    async fn save_rejects_empty_id() {
        let log = store();
        let mut e = entry("a", datetime!(2024-01-01 08:00 UTC), 300.0);
        e.id = "  ".into();
        match log.save(&e).await {
            Err(StoreError::Validation(_)) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn edited_timestamp_moves_entry_between_partitions() {
        let log = store();
        log.save(&entry("a", datetime!(2024-01-01 08:00 UTC), 300.0))
            .await
            .expect("save");
        log.save(&entry("a", datetime!(2024-01-02 08:00 UTC), 300.0))
            .await
            .expect("move");

        assert!(log.entries_for_date("2024-01-01").await.expect("read").is_empty());
        assert_eq!(log.entries_for_date("2024-01-02").await.expect("read").len(), 1);
        assert_eq!(log.read_dates().await.expect("dates"), vec!["2024-01-02"]);
        assert_index_consistent(&log).await;
    }

    #[tokio::test]
    async fn delete_unknown_id_is_noop() {
        let log = store();
        log.save(&entry("a", datetime!(2024-01-01 08:00 UTC), 300.0))
            .await
            .expect("save");
        log.delete("nope").await.expect("noop delete");
        assert_eq!(log.entries_for_date("2024-01-01").await.expect("read").len(), 1);
    }

    #[tokio::test]
    async fn partial_delete_keeps_date_indexed() {
        let log = store();
        log.save(&entry("a", datetime!(2024-01-01 08:00 UTC), 300.0))
            .await
            .expect("save");
        log.save(&entry("b", datetime!(2024-01-01 13:00 UTC), 200.0))
            .await
            .expect("save");

        log.delete("a").await.expect("delete");
        assert_eq!(log.entries_for_date("2024-01-01").await.expect("read").len(), 1);
        assert_eq!(log.read_dates().await.expect("dates"), vec!["2024-01-01"]);
        assert_index_consistent(&log).await;
    }

    #[tokio::test]
    async fn range_is_inclusive_and_sorted() {
        let log = store();
        for (id, ts) in [
            ("a", datetime!(2024-01-01 08:00 UTC)),
            ("b", datetime!(2024-01-03 08:00 UTC)),
            ("c", datetime!(2024-01-05 08:00 UTC)),
            ("d", datetime!(2024-02-01 08:00 UTC)),
        ] {
            log.save(&entry(id, ts, 100.0)).await.expect("save");
        }

        let range = log
            .entries_for_range("2024-01-01", "2024-01-31")
            .await
            .expect("range");
        let dates: Vec<&str> = range.keys().map(String::as_str).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-03", "2024-01-05"]);
    }

    #[tokio::test]
    async fn corrupt_partition_reads_as_empty() {
        let log = store();
        log.store
            .set("food_logs_2024-01-01", "{definitely not json")
            .await
            .expect("seed corrupt blob");
        assert!(log.entries_for_date("2024-01-01").await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn concurrent_same_date_saves_lose_nothing() {
        let log = store();
        let mut handles = Vec::new();
        for i in 0..10 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                let e = entry(&format!("id-{i}"), datetime!(2024-01-01 08:00 UTC), 100.0);
                log.save(&e).await
            }));
        }
        for h in handles {
            h.await.expect("join").expect("save");
        }
        assert_eq!(log.entries_for_date("2024-01-01").await.expect("read").len(), 10);
        assert_index_consistent(&log).await;
    }
}
