use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::query::TimeWindow;

/// Anchor-moment provider. The resolver itself never touches the wall clock;
/// surfaces inject the anchor through this seam so tests can pin it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;
}

pub struct VenueClock {
    tz: Tz,
}

impl VenueClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for VenueClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

// Weekday names indexed 0=Monday, matching num_days_from_monday.
const WEEKDAYS: &[(&str, i64)] = &[
    ("monday", 0),
    ("tuesday", 1),
    ("wednesday", 2),
    ("thursday", 3),
    ("friday", 4),
    ("saturday", 5),
    ("sunday", 6),
];

/// Turns a fuzzy phrase plus an anchor moment into a date window. Matching is
/// case-insensitive substring, checked in fixed priority order; the first hit
/// wins. A phrase with no recognized token yields an open window starting on
/// the anchor's day — every matched branch sets an end date.
pub fn resolve_time_expression(phrase: &str, anchor: DateTime<Tz>) -> TimeWindow {
    let expression = phrase.trim().to_lowercase();
    let mut start = anchor;
    let mut end: Option<DateTime<Tz>> = None;

    if expression.contains("tonight") {
        end = Some(end_of_day(anchor));
    } else if expression.contains("today") {
        start = start_of_day(anchor);
        end = Some(end_of_day(anchor));
    } else if expression.contains("tomorrow") {
        start = start_of_day(anchor + Duration::days(1));
        end = Some(end_of_day(start));
    } else if expression.contains("this week") && !expression.contains("weekend") {
        // "this weekend" contains "this week"; the weekend branch owns it.
        let until_sunday = 6 - weekday_index(anchor);
        end = Some(end_of_day(anchor + Duration::days(until_sunday)));
    } else if expression.contains("next week") && !expression.contains("weekend") {
        let mut until_monday = (7 - weekday_index(anchor)) % 7;
        if until_monday == 0 {
            until_monday = 7;
        }
        start = start_of_day(anchor + Duration::days(until_monday));
        end = Some(end_of_day(start + Duration::days(6)));
    } else if expression.contains("weekend") {
        let until_saturday = if expression.contains("next") {
            (5 - weekday_index(anchor)).rem_euclid(7) + 7
        } else if weekday_index(anchor) == 6 {
            // A Sunday anchor is already inside a weekend; back up to its
            // Saturday instead of rolling a week forward.
            -1
        } else {
            (5 - weekday_index(anchor)).rem_euclid(7)
        };
        start = start_of_day(anchor + Duration::days(until_saturday));
        end = Some(end_of_day(start + Duration::days(1)));
    } else if let Some(target) = named_weekday(&expression) {
        let mut offset = (target - weekday_index(anchor)).rem_euclid(7);
        if expression.contains("next") {
            offset += 7;
        }
        start = start_of_day(anchor + Duration::days(offset));
        end = Some(end_of_day(start));
    }

    TimeWindow {
        raw_phrase: phrase.to_string(),
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.map(|e| e.format("%Y-%m-%d").to_string()),
    }
}

/// Short "current time in <city>" report for the /time command.
pub fn time_report(anchor: DateTime<Tz>, city: &str) -> String {
    format!(
        "Current time in {}:\n🗓️ {}\n⏰ {}",
        city,
        anchor.format("%A, %B %d, %Y"),
        anchor.format("%I:%M %p %Z"),
    )
}

fn weekday_index(moment: DateTime<Tz>) -> i64 {
    moment.weekday().num_days_from_monday() as i64
}

fn named_weekday(expression: &str) -> Option<i64> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| expression.contains(name))
        .map(|(_, index)| *index)
}

pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap();
    tz.from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

fn start_of_day(moment: DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(moment.date_naive(), moment.timezone())
}

fn end_of_day(moment: DateTime<Tz>) -> DateTime<Tz> {
    let tz = moment.timezone();
    let naive = moment.date_naive().and_hms_opt(23, 59, 59).unwrap();
    tz.from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    // 2024-06-12 is a Wednesday.
    fn wednesday_afternoon() -> DateTime<Tz> {
        Los_Angeles.with_ymd_and_hms(2024, 6, 12, 15, 30, 0).unwrap()
    }

    #[test]
    fn tonight_keeps_the_anchor_day() {
        let window = resolve_time_expression("what's on tonight", wednesday_afternoon());
        assert_eq!(window.start_date, "2024-06-12");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-12"));
    }

    #[test]
    fn today_is_a_single_day_window() {
        let window = resolve_time_expression("anything today?", wednesday_afternoon());
        assert_eq!(window.start_date, "2024-06-12");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-12"));
    }

    #[test]
    fn tonight_outranks_a_weekday_name() {
        // Both tokens present; "tonight" is checked first.
        let window = resolve_time_expression("friday or tonight", wednesday_afternoon());
        assert_eq!(window.start_date, "2024-06-12");
    }

    #[test]
    fn this_week_ends_on_the_coming_sunday() {
        let window = resolve_time_expression("this week", wednesday_afternoon());
        assert_eq!(window.start_date, "2024-06-12");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-16"));
    }

    #[test]
    fn this_week_on_sunday_ends_same_day() {
        let sunday = Los_Angeles.with_ymd_and_hms(2024, 6, 16, 9, 0, 0).unwrap();
        let window = resolve_time_expression("this week", sunday);
        assert_eq!(window.start_date, "2024-06-16");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-16"));
    }

    #[test]
    fn next_week_from_monday_skips_to_the_following_monday() {
        let monday = Los_Angeles.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let window = resolve_time_expression("next week", monday);
        assert_eq!(window.start_date, "2024-06-17");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-23"));
    }

    #[test]
    fn this_weekend_midweek_lands_on_saturday() {
        let window = resolve_time_expression("this weekend", wednesday_afternoon());
        assert_eq!(window.start_date, "2024-06-15");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-16"));
    }

    #[test]
    fn weekend_on_saturday_starts_that_day() {
        let saturday = Los_Angeles.with_ymd_and_hms(2024, 6, 15, 11, 0, 0).unwrap();
        let window = resolve_time_expression("this weekend", saturday);
        assert_eq!(window.start_date, "2024-06-15");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-16"));
    }

    #[test]
    fn weekend_on_sunday_backs_up_to_its_saturday() {
        let sunday = Los_Angeles.with_ymd_and_hms(2024, 6, 16, 11, 0, 0).unwrap();
        let window = resolve_time_expression("this weekend", sunday);
        assert_eq!(window.start_date, "2024-06-15");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-16"));
    }

    #[test]
    fn next_weekend_rolls_a_full_week_forward() {
        let window = resolve_time_expression("next weekend", wednesday_afternoon());
        assert_eq!(window.start_date, "2024-06-22");
        assert_eq!(window.end_date.as_deref(), Some("2024-06-23"));
    }

    #[test]
    fn unmatched_phrase_leaves_an_open_window() {
        let window = resolve_time_expression("magic shows", wednesday_afternoon());
        assert_eq!(window.start_date, "2024-06-12");
        assert_eq!(window.end_date, None);
        assert_eq!(window.raw_phrase, "magic shows");
    }

    #[test]
    fn time_report_names_the_city_and_day() {
        let report = time_report(wednesday_afternoon(), "Las Vegas");
        assert!(report.contains("Las Vegas"));
        assert!(report.contains("Wednesday, June 12, 2024"));
        assert!(report.contains("03:30 PM"));
    }
}
