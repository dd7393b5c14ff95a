//! The tracker: validated writes, derived metrics, and persistence.
//!
//! A [`Tracker`] owns the [`RecordStore`] and its persistence collaborator.
//! Every write is validated before a record is built, replaces any record
//! already on that day, and is followed immediately by a snapshot save.

use crate::config::RecommendationConfig;
use crate::recommend::{suggest_optimal_sleep_time, SleepRecommendation};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::store::UpsertOutcome;
use crate::{
    continuous_diary_days, validate, CalendarDay, DailyCondition, DiaryEntry, EnergyLevel,
    Feeling, Record, RecordKind, RecordStore, Result, SleepRecord,
};

/// Result of a successful write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recorded {
    pub kind: RecordKind,
    pub date: CalendarDay,
    pub outcome: UpsertOutcome,
}

impl Recorded {
    /// Human-readable confirmation
    pub fn message(&self) -> String {
        let what = match self.kind {
            RecordKind::Sleep => "Sleep duration",
            RecordKind::Condition => "Condition",
            RecordKind::Diary => "Diary entry",
        };
        match self.outcome {
            UpsertOutcome::Inserted => format!("{} recorded for {}.", what, self.date),
            UpsertOutcome::Replaced => format!("{} updated for {}.", what, self.date),
        }
    }
}

/// Counts from [`Tracker::import_snapshot`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub replaced: usize,
    pub skipped: usize,
}

impl ImportSummary {
    fn count(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Replaced => self.replaced += 1,
        }
    }
}

/// Application context for one user's records
pub struct Tracker<S: SnapshotStore> {
    store: RecordStore,
    sink: S,
    recommendation: RecommendationConfig,
}

impl<S: SnapshotStore> Tracker<S> {
    /// Load the current snapshot from `sink` and start tracking
    pub fn open(mut sink: S, recommendation: RecommendationConfig) -> Result<Self> {
        let store = sink.load()?.into_store();
        Ok(Self {
            store,
            sink,
            recommendation,
        })
    }

    pub fn records(&self) -> &RecordStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Apply `change` to a copy of the store, save the copy, then adopt it
    ///
    /// If the save fails the in-memory store is left exactly as it was.
    fn commit<T>(&mut self, change: impl FnOnce(&mut RecordStore) -> T) -> Result<T> {
        let mut staged = self.store.clone();
        let value = change(&mut staged);
        self.sink.save(&staged.to_snapshot())?;
        self.store = staged;
        Ok(value)
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Record hours slept on `date`; rejects anything outside `(0, 24]`
    pub fn record_sleep(&mut self, date: impl Into<CalendarDay>, hours: f64) -> Result<Recorded> {
        let date = date.into();
        let duration_hours = validate::sleep_duration(hours)?;
        tracing::debug!("Recording sleep: {} = {}h", date, duration_hours);

        let outcome = self.commit(|store| {
            store.upsert_sleep(SleepRecord {
                date,
                duration_hours,
            })
        })?;
        Ok(Recorded {
            kind: RecordKind::Sleep,
            date,
            outcome,
        })
    }

    /// Record the day's feeling and energy level
    pub fn record_condition(
        &mut self,
        date: impl Into<CalendarDay>,
        feeling: Feeling,
        energy_level: EnergyLevel,
    ) -> Result<Recorded> {
        let date = date.into();
        tracing::debug!("Recording condition: {} = {}/{}", date, feeling, energy_level);

        let outcome = self.commit(|store| {
            store.upsert_condition(DailyCondition {
                date,
                feeling,
                energy_level,
            })
        })?;
        Ok(Recorded {
            kind: RecordKind::Condition,
            date,
            outcome,
        })
    }

    /// Record the day's diary entry; text is trimmed and must not end up empty
    pub fn record_diary(&mut self, date: impl Into<CalendarDay>, text: &str) -> Result<Recorded> {
        let date = date.into();
        let text = validate::diary_text(text)?;
        tracing::debug!("Recording diary: {} ({} chars)", date, text.chars().count());

        let outcome = self.commit(|store| store.upsert_diary(DiaryEntry { date, text }))?;
        Ok(Recorded {
            kind: RecordKind::Diary,
            date,
            outcome,
        })
    }

    /// Delete every record of every kind
    pub fn clear_all(&mut self) -> Result<()> {
        self.commit(RecordStore::clear)?;
        tracing::info!("Cleared all records");
        Ok(())
    }

    /// Merge a snapshot through the same validation as individual writes
    ///
    /// Imported records replace existing ones on the same day. The result is
    /// saved once, and only if something was imported. Nothing is merged
    /// if that save fails.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        let mut staged = self.store.clone();

        for record in snapshot.sleep_records {
            match validate::sleep_duration(record.duration_hours) {
                Ok(_) => summary.count(staged.upsert_sleep(record)),
                Err(e) => {
                    tracing::warn!("Not importing sleep record for {}: {}", record.date, e);
                    summary.skipped += 1;
                }
            }
        }

        for record in snapshot.daily_conditions {
            summary.count(staged.upsert_condition(record));
        }

        for entry in snapshot.diary_entries {
            match validate::diary_text(&entry.text) {
                Ok(text) => summary.count(staged.upsert_diary(DiaryEntry {
                    date: entry.date,
                    text,
                })),
                Err(e) => {
                    tracing::warn!("Not importing diary entry for {}: {}", entry.date, e);
                    summary.skipped += 1;
                }
            }
        }

        if summary.inserted + summary.replaced > 0 {
            self.sink.save(&staged.to_snapshot())?;
            self.store = staged;
        }
        tracing::info!(
            "Imported {} new, {} replaced, {} skipped",
            summary.inserted,
            summary.replaced,
            summary.skipped
        );
        Ok(summary)
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn get_by_date(&self, kind: RecordKind, date: impl Into<CalendarDay>) -> Option<Record> {
        self.store.get(kind, date.into())
    }

    pub fn all_records(&self, kind: RecordKind) -> Vec<Record> {
        self.store.all(kind)
    }

    /// Records of `kind` within `[start, end]`, ascending by date
    pub fn records_in_range(
        &self,
        kind: RecordKind,
        start: CalendarDay,
        end: CalendarDay,
    ) -> Vec<Record> {
        self.store.records_in_range(kind, start, end)
    }

    /// Distinct days with a record of `kind`
    pub fn unique_record_date_count(&self, kind: RecordKind) -> usize {
        self.store.unique_record_date_count(kind)
    }

    /// Diary streak as of today's local date
    pub fn continuous_diary_days(&self) -> u32 {
        self.continuous_diary_days_on(CalendarDay::today())
    }

    pub fn continuous_diary_days_on(&self, today: CalendarDay) -> u32 {
        continuous_diary_days(self.store.diary(), today)
    }

    /// Sleep recommendation as of today's local date
    pub fn suggest_optimal_sleep_time(&self) -> SleepRecommendation {
        self.suggest_optimal_sleep_time_on(CalendarDay::today())
    }

    pub fn suggest_optimal_sleep_time_on(&self, today: CalendarDay) -> SleepRecommendation {
        suggest_optimal_sleep_time(self.store.sleep(), today, &self.recommendation)
    }
}
