use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::models::query::{DiscoveryQuery, TimeWindow};
use crate::service::time_service::local_midnight;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pure construction of the Discovery request parameters for a window.
/// The start instant is clamped so the feed is never asked for anything
/// before the anchor; an open window sends no upper bound at all.
pub fn build_query(
    window: &TimeWindow,
    category: Option<&str>,
    venue_keyword: Option<&str>,
    size: Option<i64>,
    anchor: DateTime<Tz>,
) -> DiscoveryQuery {
    DiscoveryQuery {
        size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        keyword: venue_keyword.map(str::to_string),
        classification: category.map(str::to_string),
        start_date_time: effective_start(&window.start_date, anchor),
        end_date_time: window
            .end_date
            .as_deref()
            .map(|date| format!("{}T23:59:59Z", date)),
    }
}

fn effective_start(start_date: &str, anchor: DateTime<Tz>) -> String {
    let window_start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .ok()
        .map(|date| local_midnight(date, anchor.timezone()));
    let start = match window_start {
        Some(midnight) if midnight > anchor => midnight,
        _ => anchor,
    };
    start.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
