//! Continuous diary-day streak.
//!
//! A streak is live when the latest entry is today. It is also still live
//! when the latest entry is yesterday: not having written today's entry yet
//! does not break it. Anything older than yesterday means the streak is over.

use crate::{CalendarDay, DayMap, DiaryEntry};

/// Number of consecutive days, ending today or yesterday, that have a diary entry
pub fn continuous_diary_days(diary: &DayMap<DiaryEntry>, today: CalendarDay) -> u32 {
    let mut dates = diary.dates().rev();

    let Some(latest) = dates.next() else {
        tracing::debug!("No diary entries, streak is 0");
        return 0;
    };

    let anchored = latest == today || Some(latest) == today.pred();
    if !anchored {
        tracing::debug!("Latest diary entry {} is older than yesterday, streak broken", latest);
        return 0;
    }

    let mut count = 1;
    let mut cursor = latest;
    for date in dates {
        if Some(date) != cursor.pred() {
            break;
        }
        count += 1;
        cursor = date;
    }

    tracing::debug!("Diary streak of {} days ending {}", count, latest);
    count
}
