//! Date-range queries over the record store.
//!
//! Ranges compare calendar days only and are inclusive at both ends.
//! An empty result is normal (nothing logged yet) and never an error.

use crate::store::collect_records;
use crate::{CalendarDay, DatedRecord, DayMap, Record, RecordKind, RecordStore};

/// Inclusive `[today - days, today]` window used for trailing aggregates
pub fn trailing_window(today: CalendarDay, days: u32) -> (CalendarDay, CalendarDay) {
    let start = today.days_before(days).unwrap_or(CalendarDay::MIN);
    (start, today)
}

impl<R: DatedRecord> DayMap<R> {
    /// Records dated within `[start, end]`, ascending by date
    ///
    /// Returns an empty vector when `start > end`.
    pub fn in_range(&self, start: CalendarDay, end: CalendarDay) -> Vec<&R> {
        if start > end {
            return Vec::new();
        }
        let records: Vec<&R> = self.range_values(start, end).map(|(_, r)| r).collect();
        tracing::debug!(
            "Found {} {} records between {} and {}",
            records.len(),
            R::KIND,
            start,
            end
        );
        records
    }

    /// Every record, most recent first
    pub fn newest_first(&self) -> Vec<&R> {
        self.iter().rev().collect()
    }
}

impl RecordStore {
    /// Records of `kind` dated within `[start, end]`, ascending by date
    pub fn records_in_range(
        &self,
        kind: RecordKind,
        start: CalendarDay,
        end: CalendarDay,
    ) -> Vec<Record> {
        match kind {
            RecordKind::Sleep => collect_records(self.sleep().in_range(start, end)),
            RecordKind::Condition => collect_records(self.conditions().in_range(start, end)),
            RecordKind::Diary => collect_records(self.diary().in_range(start, end)),
        }
    }

    /// Every record of `kind`, most recent first
    pub fn history_newest_first(&self, kind: RecordKind) -> Vec<Record> {
        match kind {
            RecordKind::Sleep => collect_records(self.sleep().newest_first()),
            RecordKind::Condition => collect_records(self.conditions().newest_first()),
            RecordKind::Diary => collect_records(self.diary().newest_first()),
        }
    }

    /// Number of distinct days holding a record of `kind`
    pub fn unique_record_date_count(&self, kind: RecordKind) -> usize {
        // One record per day is a store invariant, so this is the collection size
        self.len(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SleepRecord;

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        CalendarDay::from_ymd(y, m, d).unwrap()
    }

    fn sleep_map(days: &[(CalendarDay, f64)]) -> DayMap<SleepRecord> {
        days.iter()
            .map(|&(date, duration_hours)| SleepRecord {
                date,
                duration_hours,
            })
            .collect()
    }

    #[test]
    fn test_range_is_inclusive_and_ascending() {
        let map = sleep_map(&[
            (day(2024, 1, 10), 7.0),
            (day(2024, 1, 1), 6.0),
            (day(2024, 1, 5), 8.0),
            (day(2024, 1, 3), 7.5),
            (day(2024, 1, 11), 9.0),
        ]);

        let found = map.in_range(day(2024, 1, 3), day(2024, 1, 10));
        let dates: Vec<_> = found.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 3), day(2024, 1, 5), day(2024, 1, 10)]);
    }

    #[test]
    fn test_range_across_month_boundary() {
        let map = sleep_map(&[(day(2024, 1, 31), 7.0), (day(2024, 2, 1), 6.0)]);
        assert_eq!(map.in_range(day(2024, 1, 30), day(2024, 2, 1)).len(), 2);
    }

    #[test]
    fn test_empty_and_inverted_ranges() {
        let map = sleep_map(&[(day(2024, 1, 5), 7.0)]);
        assert!(map.in_range(day(2024, 2, 1), day(2024, 2, 28)).is_empty());
        assert!(map.in_range(day(2024, 1, 6), day(2024, 1, 4)).is_empty());
        assert!(DayMap::<SleepRecord>::new()
            .in_range(day(2024, 1, 1), day(2024, 12, 31))
            .is_empty());
    }

    #[test]
    fn test_trailing_window_spans_eight_calendar_days() {
        let (start, end) = trailing_window(day(2024, 3, 3), 7);
        assert_eq!(start, day(2024, 2, 25));
        assert_eq!(end, day(2024, 3, 3));
    }

    #[test]
    fn test_newest_first() {
        let map = sleep_map(&[(day(2024, 1, 1), 6.0), (day(2024, 1, 2), 7.0)]);
        let newest = map.newest_first();
        assert_eq!(newest[0].date, day(2024, 1, 2));
        assert_eq!(newest[1].date, day(2024, 1, 1));
    }

    #[test]
    fn test_store_range_and_unique_count() {
        let mut store = RecordStore::new();
        store.upsert_sleep(SleepRecord {
            date: day(2024, 1, 1),
            duration_hours: 6.0,
        });
        store.upsert_sleep(SleepRecord {
            date: day(2024, 1, 1),
            duration_hours: 7.0,
        });
        store.upsert_sleep(SleepRecord {
            date: day(2024, 1, 4),
            duration_hours: 8.0,
        });

        assert_eq!(store.unique_record_date_count(RecordKind::Sleep), 2);
        assert_eq!(store.unique_record_date_count(RecordKind::Diary), 0);

        let in_range = store.records_in_range(RecordKind::Sleep, day(2024, 1, 1), day(2024, 1, 3));
        assert_eq!(in_range, vec![Record::Sleep(SleepRecord {
            date: day(2024, 1, 1),
            duration_hours: 7.0,
        })]);

        let history = store.history_newest_first(RecordKind::Sleep);
        assert_eq!(history[0].date(), day(2024, 1, 4));
    }
}
