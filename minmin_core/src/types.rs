//! Core domain types for the minmin tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Calendar days (the identity every record is keyed on)
//! - The three record kinds: sleep, daily condition, diary
//! - Feeling and energy scales

use crate::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Calendar Day
// ============================================================================

/// A local calendar day with no time-of-day or timezone component.
///
/// Equality and ordering are structural (year, then month, then day), so two
/// writes made at different times of the same day always land on the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Earliest representable day
    pub const MIN: CalendarDay = CalendarDay(NaiveDate::MIN);

    /// Build a day from year/month/day, returning None for impossible dates
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today according to the local clock
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Strip the time-of-day from a zoned timestamp, in that timestamp's own zone
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self(dt.date_naive())
    }

    /// The day before, or None at the start of the calendar
    pub fn pred(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// The day after, or None at the end of the calendar
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The day `days` days earlier, or None if that underflows the calendar
    pub fn days_before(self, days: u32) -> Option<Self> {
        self.0
            .checked_sub_days(chrono::Days::new(u64::from(days)))
            .map(Self)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<NaiveDateTime> for CalendarDay {
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt.date())
    }
}

impl FromStr for CalendarDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| Error::Parse(format!("invalid date {:?} (expected YYYY-MM-DD): {}", s, e)))
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

// ============================================================================
// Condition Scales
// ============================================================================

/// How the day felt overall
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Feeling {
    #[serde(alias = "とても良い")]
    VeryGood,
    #[serde(alias = "良い")]
    Good,
    #[serde(alias = "普通")]
    Neutral,
    #[serde(alias = "悪い")]
    Bad,
    #[serde(alias = "とても悪い")]
    VeryBad,
}

impl Feeling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::VeryGood => "very-good",
            Feeling::Good => "good",
            Feeling::Neutral => "neutral",
            Feeling::Bad => "bad",
            Feeling::VeryBad => "very-bad",
        }
    }
}

impl FromStr for Feeling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "very-good" | "とても良い" => Ok(Feeling::VeryGood),
            "good" | "良い" => Ok(Feeling::Good),
            "neutral" | "普通" => Ok(Feeling::Neutral),
            "bad" | "悪い" => Ok(Feeling::Bad),
            "very-bad" | "とても悪い" => Ok(Feeling::VeryBad),
            other => Err(Error::Parse(format!(
                "unknown feeling {:?} (expected very-good, good, neutral, bad, very-bad)",
                other
            ))),
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Energy level for the day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyLevel {
    #[serde(alias = "高い")]
    High,
    #[serde(alias = "普通")]
    Normal,
    #[serde(alias = "低い")]
    Low,
    #[serde(alias = "非常に低い")]
    VeryLow,
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::High => "high",
            EnergyLevel::Normal => "normal",
            EnergyLevel::Low => "low",
            EnergyLevel::VeryLow => "very-low",
        }
    }
}

impl FromStr for EnergyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "high" | "高い" => Ok(EnergyLevel::High),
            "normal" | "普通" => Ok(EnergyLevel::Normal),
            "low" | "低い" => Ok(EnergyLevel::Low),
            "very-low" | "非常に低い" => Ok(EnergyLevel::VeryLow),
            other => Err(Error::Parse(format!(
                "unknown energy level {:?} (expected high, normal, low, very-low)",
                other
            ))),
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Which of the three independent collections a record belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Sleep,
    Condition,
    Diary,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Sleep, RecordKind::Condition, RecordKind::Diary];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Sleep => "sleep",
            RecordKind::Condition => "condition",
            RecordKind::Diary => "diary",
        }
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sleep" => Ok(RecordKind::Sleep),
            "condition" | "conditions" => Ok(RecordKind::Condition),
            "diary" => Ok(RecordKind::Diary),
            other => Err(Error::Parse(format!(
                "unknown record kind {:?} (expected sleep, condition, diary)",
                other
            ))),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hours slept on a given day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SleepRecord {
    pub date: CalendarDay,
    #[serde(alias = "durationHours")]
    pub duration_hours: f64,
}

/// Mood and energy for a given day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCondition {
    pub date: CalendarDay,
    pub feeling: Feeling,
    #[serde(alias = "energyLevel")]
    pub energy_level: EnergyLevel,
}

/// Free-text pre-sleep diary entry for a given day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiaryEntry {
    pub date: CalendarDay,
    #[serde(alias = "entryText")]
    pub text: String,
}

/// Common surface of the three record kinds
pub trait DatedRecord: Clone {
    const KIND: RecordKind;

    fn date(&self) -> CalendarDay;

    fn into_record(self) -> Record;
}

impl DatedRecord for SleepRecord {
    const KIND: RecordKind = RecordKind::Sleep;

    fn date(&self) -> CalendarDay {
        self.date
    }

    fn into_record(self) -> Record {
        Record::Sleep(self)
    }
}

impl DatedRecord for DailyCondition {
    const KIND: RecordKind = RecordKind::Condition;

    fn date(&self) -> CalendarDay {
        self.date
    }

    fn into_record(self) -> Record {
        Record::Condition(self)
    }
}

impl DatedRecord for DiaryEntry {
    const KIND: RecordKind = RecordKind::Diary;

    fn date(&self) -> CalendarDay {
        self.date
    }

    fn into_record(self) -> Record {
        Record::Diary(self)
    }
}

/// Any record, for kind-dispatched access
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Sleep(SleepRecord),
    Condition(DailyCondition),
    Diary(DiaryEntry),
}

impl Record {
    pub fn date(&self) -> CalendarDay {
        match self {
            Record::Sleep(r) => r.date,
            Record::Condition(r) => r.date,
            Record::Diary(r) => r.date,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Sleep(_) => RecordKind::Sleep,
            Record::Condition(_) => RecordKind::Condition,
            Record::Diary(_) => RecordKind::Diary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime};

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        CalendarDay::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_day_parse_and_display() {
        let d: CalendarDay = "2024-03-09".parse().unwrap();
        assert_eq!(d, day(2024, 3, 9));
        assert_eq!(d.to_string(), "2024-03-09");
        assert_eq!(d.as_naive(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn test_calendar_day_rejects_bad_input() {
        assert!("2024-02-30".parse::<CalendarDay>().is_err());
        assert!("09/03/2024".parse::<CalendarDay>().is_err());
        assert!(CalendarDay::from_ymd(2023, 2, 29).is_none());
    }

    #[test]
    fn test_time_of_day_is_stripped() {
        let morning = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(0, 5, 0).unwrap());
        let night = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        assert_eq!(CalendarDay::from(morning), CalendarDay::from(night));
    }

    #[test]
    fn test_from_datetime_uses_its_own_zone() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let dt = tz.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        assert_eq!(CalendarDay::from_datetime(&dt), day(2024, 5, 1));

        // 01:00 on the 2nd at +09:00 is still the 1st in UTC
        let early = tz.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap();
        assert_eq!(CalendarDay::from_datetime(&early), day(2024, 5, 2));
    }

    #[test]
    fn test_ordering_and_arithmetic_cross_month_boundaries() {
        let d = day(2024, 3, 1);
        assert_eq!(d.pred(), Some(day(2024, 2, 29)));
        assert_eq!(day(2024, 12, 31).succ(), Some(day(2025, 1, 1)));
        assert_eq!(d.days_before(7), Some(day(2024, 2, 23)));
        assert!(day(2024, 2, 29) < d);
        assert_eq!(CalendarDay::MIN.pred(), None);
    }

    #[test]
    fn test_serde_uses_plain_date_string() {
        let rec = SleepRecord {
            date: day(2024, 1, 2),
            duration_hours: 7.5,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"date":"2024-01-02","duration_hours":7.5}"#);
    }

    #[test]
    fn test_parse_feelings_and_energy() {
        assert_eq!("very-good".parse::<Feeling>().unwrap(), Feeling::VeryGood);
        assert_eq!("VERY_BAD".parse::<Feeling>().unwrap(), Feeling::VeryBad);
        assert_eq!("普通".parse::<Feeling>().unwrap(), Feeling::Neutral);
        assert!("meh".parse::<Feeling>().is_err());

        assert_eq!("very-low".parse::<EnergyLevel>().unwrap(), EnergyLevel::VeryLow);
        assert_eq!("高い".parse::<EnergyLevel>().unwrap(), EnergyLevel::High);
        assert!("extreme".parse::<EnergyLevel>().is_err());
    }

    #[test]
    fn test_legacy_field_names_deserialize() {
        let json = r#"{"date":"2024-01-02","feeling":"とても良い","energyLevel":"低い"}"#;
        let cond: DailyCondition = serde_json::from_str(json).unwrap();
        assert_eq!(cond.feeling, Feeling::VeryGood);
        assert_eq!(cond.energy_level, EnergyLevel::Low);
    }

    #[test]
    fn test_record_kind_roundtrip() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
    }
}
