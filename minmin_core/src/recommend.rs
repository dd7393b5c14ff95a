//! Sleep-duration recommendation from the trailing week of sleep records.
//!
//! Rules, relative to the configured baseline `b` (default 8.0 hours):
//!
//! | average          | recommended |
//! |------------------|-------------|
//! | `< b - 1.0`      | `b + 1.5`   |
//! | `< b - 0.5`      | `b + 1.0`   |
//! | `< b`            | `b + 0.5`   |
//! | `>= b`           | `b`         |
//!
//! Every boundary is half-open: an average of exactly `b - 1.0` falls in
//! the second row.

use crate::config::RecommendationConfig;
use crate::query::trailing_window;
use crate::{CalendarDay, DayMap, SleepRecord};

/// Which rule produced a recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecommendationTier {
    /// No sleep recorded inside the window
    NoData,
    SevereDeficit,
    ModerateDeficit,
    MildDeficit,
    Sufficient,
}

/// Output of [`suggest_optimal_sleep_time`]
#[derive(Clone, Debug, PartialEq)]
pub struct SleepRecommendation {
    pub recommended_hours: f64,
    /// Mean over the days inside the window that have a record
    pub average_hours: Option<f64>,
    pub tier: RecommendationTier,
    pub message: String,
}

/// Recommend tonight's sleep duration from the records in `[today - window, today]`
pub fn suggest_optimal_sleep_time(
    sleep: &DayMap<SleepRecord>,
    today: CalendarDay,
    config: &RecommendationConfig,
) -> SleepRecommendation {
    let baseline = config.baseline_hours;
    let (start, end) = trailing_window(today, config.window_days);
    let window = sleep.in_range(start, end);

    if window.is_empty() {
        tracing::info!("No sleep records since {}, recommending baseline", start);
        return SleepRecommendation {
            recommended_hours: baseline,
            average_hours: None,
            tier: RecommendationTier::NoData,
            message: format!(
                "No sleep records yet. Start by logging your sleep every day. \
                 The baseline recommendation is {:.1} hours.",
                baseline
            ),
        };
    }

    // Missing days are absent from the mean, not counted as zero
    let total: f64 = window.iter().map(|r| r.duration_hours).sum();
    let average = total / window.len() as f64;

    let (tier, recommended_hours) = select_tier(average, baseline);

    let advice = match tier {
        RecommendationTier::SevereDeficit => "You are quite short on sleep. We strongly recommend",
        RecommendationTier::ModerateDeficit => "Your sleep is running a little short. We recommend",
        RecommendationTier::MildDeficit => "A bit more sleep would help. We recommend",
        RecommendationTier::Sufficient | RecommendationTier::NoData => {
            "You are getting enough sleep! We recommend"
        }
    };

    tracing::info!(
        "Average sleep {:.1}h over {} days, recommending {:.1}h ({:?})",
        average,
        window.len(),
        recommended_hours,
        tier
    );

    SleepRecommendation {
        recommended_hours,
        average_hours: Some(average),
        tier,
        message: format!(
            "Average sleep over the past week: {:.1} hours. {} {:.1} hours tonight.",
            average, advice, recommended_hours
        ),
    }
}

fn select_tier(average: f64, baseline: f64) -> (RecommendationTier, f64) {
    if average < baseline - 1.0 {
        (RecommendationTier::SevereDeficit, baseline + 1.5)
    } else if average < baseline - 0.5 {
        (RecommendationTier::ModerateDeficit, baseline + 1.0)
    } else if average < baseline {
        (RecommendationTier::MildDeficit, baseline + 0.5)
    } else {
        (RecommendationTier::Sufficient, baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> CalendarDay {
        CalendarDay::from_ymd(2024, 6, 15).unwrap()
    }

    /// Sleep map with `hours[i]` recorded `i` days before today
    fn sleep_history(hours: &[f64]) -> DayMap<SleepRecord> {
        hours
            .iter()
            .enumerate()
            .map(|(i, &h)| SleepRecord {
                date: today().days_before(i as u32).unwrap(),
                duration_hours: h,
            })
            .collect()
    }

    fn suggest(hours: &[f64]) -> SleepRecommendation {
        suggest_optimal_sleep_time(
            &sleep_history(hours),
            today(),
            &RecommendationConfig::default(),
        )
    }

    #[test]
    fn test_no_records_recommends_baseline() {
        let rec = suggest(&[]);
        assert_eq!(rec.recommended_hours, 8.0);
        assert_eq!(rec.tier, RecommendationTier::NoData);
        assert_eq!(rec.average_hours, None);
        assert!(rec.message.contains("No sleep records"));
    }

    #[test]
    fn test_average_at_baseline_keeps_baseline() {
        let rec = suggest(&[8.0; 7]);
        assert_eq!(rec.recommended_hours, 8.0);
        assert_eq!(rec.tier, RecommendationTier::Sufficient);
    }

    #[test]
    fn test_average_of_seven_and_a_half_is_mild_deficit() {
        // 7.5 is the lower bound of [7.5, 8.0)
        let rec = suggest(&[7.0, 8.0, 7.0, 8.0, 7.5, 7.5, 7.5]);
        assert_eq!(rec.average_hours, Some(7.5));
        assert_eq!(rec.tier, RecommendationTier::MildDeficit);
        assert_eq!(rec.recommended_hours, 8.5);
    }

    #[test]
    fn test_tie_at_baseline_minus_one_is_moderate() {
        let rec = suggest(&[7.0; 7]);
        assert_eq!(rec.tier, RecommendationTier::ModerateDeficit);
        assert_eq!(rec.recommended_hours, 9.0);
    }

    #[test]
    fn test_severe_deficit() {
        let rec = suggest(&[5.0, 6.0, 6.5]);
        assert_eq!(rec.tier, RecommendationTier::SevereDeficit);
        assert_eq!(rec.recommended_hours, 9.5);
    }

    #[test]
    fn test_boundaries_are_half_open() {
        assert_eq!(select_tier(6.999, 8.0).0, RecommendationTier::SevereDeficit);
        assert_eq!(select_tier(7.0, 8.0).0, RecommendationTier::ModerateDeficit);
        assert_eq!(select_tier(7.499, 8.0).0, RecommendationTier::ModerateDeficit);
        assert_eq!(select_tier(7.5, 8.0).0, RecommendationTier::MildDeficit);
        assert_eq!(select_tier(7.999, 8.0).0, RecommendationTier::MildDeficit);
        assert_eq!(select_tier(8.0, 8.0).0, RecommendationTier::Sufficient);
        assert_eq!(select_tier(11.0, 8.0).0, RecommendationTier::Sufficient);
    }

    #[test]
    fn test_window_includes_day_seven_and_excludes_day_eight() {
        let mut hours = vec![8.0; 8];
        hours.push(2.0); // nine days of history, the oldest is outside
        let rec = suggest(&hours);
        assert_eq!(rec.average_hours, Some(8.0));

        // Only a record exactly 7 days ago still counts
        let mut sleep = DayMap::new();
        sleep.upsert(SleepRecord {
            date: today().days_before(7).unwrap(),
            duration_hours: 6.0,
        });
        let rec = suggest_optimal_sleep_time(&sleep, today(), &RecommendationConfig::default());
        assert_eq!(rec.tier, RecommendationTier::SevereDeficit);
    }

    #[test]
    fn test_missing_days_are_not_zero() {
        // Two records within the week average 8.0; absent days do not pull it down
        let mut sleep = DayMap::new();
        for n in [1, 4] {
            sleep.upsert(SleepRecord {
                date: today().days_before(n).unwrap(),
                duration_hours: 8.0,
            });
        }
        let rec = suggest_optimal_sleep_time(&sleep, today(), &RecommendationConfig::default());
        assert_eq!(rec.average_hours, Some(8.0));
        assert_eq!(rec.tier, RecommendationTier::Sufficient);
    }

    #[test]
    fn test_message_carries_rounded_numbers() {
        let rec = suggest(&[6.66, 6.66, 6.66]);
        assert!(rec.message.contains("6.7 hours"), "{}", rec.message);
        assert!(rec.message.contains("9.5 hours"), "{}", rec.message);
    }

    #[test]
    fn test_custom_baseline() {
        let config = RecommendationConfig {
            baseline_hours: 7.0,
            window_days: 7,
        };
        let rec = suggest_optimal_sleep_time(&sleep_history(&[6.75]), today(), &config);
        assert_eq!(rec.tier, RecommendationTier::MildDeficit);
        assert_eq!(rec.recommended_hours, 7.5);
    }
}
