//! In-memory record store.
//!
//! Holds the three independent date-keyed collections. The store does no
//! validation of its own; writes reach it only through the [`Tracker`]
//! (which validates first) or through snapshot loading (which filters).
//!
//! [`Tracker`]: crate::Tracker

use crate::{
    CalendarDay, DailyCondition, DatedRecord, DiaryEntry, Record, RecordKind, SleepRecord,
};
use std::collections::btree_map::{self, BTreeMap};

/// Whether an upsert created a new record or replaced the one for that day
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// A collection holding at most one record per calendar day.
///
/// Iteration is always in ascending date order.
#[derive(Clone, Debug, PartialEq)]
pub struct DayMap<R> {
    records: BTreeMap<CalendarDay, R>,
}

impl<R> Default for DayMap<R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<R: DatedRecord> DayMap<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `date`, if one exists
    pub fn get(&self, date: CalendarDay) -> Option<&R> {
        self.records.get(&date)
    }

    pub fn contains(&self, date: CalendarDay) -> bool {
        self.records.contains_key(&date)
    }

    /// Insert `record`, replacing any record already keyed on the same day
    pub(crate) fn upsert(&mut self, record: R) -> UpsertOutcome {
        let date = record.date();
        match self.records.insert(date, record) {
            Some(_) => {
                tracing::debug!("Replaced existing {} record for {}", R::KIND, date);
                UpsertOutcome::Replaced
            }
            None => {
                tracing::debug!("Inserted new {} record for {}", R::KIND, date);
                UpsertOutcome::Inserted
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in ascending date order
    pub fn iter(&self) -> btree_map::Values<'_, CalendarDay, R> {
        self.records.values()
    }

    /// Days that carry a record, ascending
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = CalendarDay> + '_ {
        self.records.keys().copied()
    }

    /// Most recent record, if any
    pub fn latest(&self) -> Option<&R> {
        self.records.values().next_back()
    }

    pub(crate) fn range_values(
        &self,
        start: CalendarDay,
        end: CalendarDay,
    ) -> btree_map::Range<'_, CalendarDay, R> {
        self.records.range(start..=end)
    }
}

impl<R: DatedRecord> FromIterator<R> for DayMap<R> {
    /// Later records win when two share a day
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut map = Self::new();
        for record in iter {
            map.upsert(record);
        }
        map
    }
}

/// The three record collections owned by one tracker
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordStore {
    sleep: DayMap<SleepRecord>,
    conditions: DayMap<DailyCondition>,
    diary: DayMap<DiaryEntry>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        sleep: DayMap<SleepRecord>,
        conditions: DayMap<DailyCondition>,
        diary: DayMap<DiaryEntry>,
    ) -> Self {
        Self {
            sleep,
            conditions,
            diary,
        }
    }

    pub fn sleep(&self) -> &DayMap<SleepRecord> {
        &self.sleep
    }

    pub fn conditions(&self) -> &DayMap<DailyCondition> {
        &self.conditions
    }

    pub fn diary(&self) -> &DayMap<DiaryEntry> {
        &self.diary
    }

    pub(crate) fn upsert_sleep(&mut self, record: SleepRecord) -> UpsertOutcome {
        self.sleep.upsert(record)
    }

    pub(crate) fn upsert_condition(&mut self, record: DailyCondition) -> UpsertOutcome {
        self.conditions.upsert(record)
    }

    pub(crate) fn upsert_diary(&mut self, record: DiaryEntry) -> UpsertOutcome {
        self.diary.upsert(record)
    }

    /// Record of `kind` for `date`, if one exists
    pub fn get(&self, kind: RecordKind, date: CalendarDay) -> Option<Record> {
        match kind {
            RecordKind::Sleep => self.sleep.get(date).cloned().map(Record::Sleep),
            RecordKind::Condition => self.conditions.get(date).cloned().map(Record::Condition),
            RecordKind::Diary => self.diary.get(date).cloned().map(Record::Diary),
        }
    }

    /// Every record of `kind`
    pub fn all(&self, kind: RecordKind) -> Vec<Record> {
        match kind {
            RecordKind::Sleep => collect_records(&self.sleep),
            RecordKind::Condition => collect_records(&self.conditions),
            RecordKind::Diary => collect_records(&self.diary),
        }
    }

    pub fn len(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Sleep => self.sleep.len(),
            RecordKind::Condition => self.conditions.len(),
            RecordKind::Diary => self.diary.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sleep.is_empty() && self.conditions.is_empty() && self.diary.is_empty()
    }

    /// Empty all three collections
    pub(crate) fn clear(&mut self) {
        self.sleep.clear();
        self.conditions.clear();
        self.diary.clear();
    }
}

pub(crate) fn collect_records<'a, R, I>(records: I) -> Vec<Record>
where
    R: DatedRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    records.into_iter().cloned().map(R::into_record).collect()
}

impl<'a, R: DatedRecord> IntoIterator for &'a DayMap<R> {
    type Item = &'a R;
    type IntoIter = btree_map::Values<'a, CalendarDay, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
