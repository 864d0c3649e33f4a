use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::models::event::{EventRecord, EventReport};

pub const NO_EVENTS_REPORT: &str = "No events found matching your criteria.";

/// What the report needs to know about the request that produced it.
pub struct ReportContext<'a> {
    pub phrase: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub anchor: DateTime<Tz>,
    pub city: &'a str,
}

/// Stable sort by calendar day (same-day events keep feed order, the feed is
/// already asked for date,asc), then cap. A non-positive cap empties the list
/// without being an error.
pub fn sort_and_cap(mut records: Vec<EventRecord>, size_cap: i64) -> Vec<EventRecord> {
    records.sort_by_key(|event| event.start_moment.date_naive());
    if size_cap <= 0 {
        records.clear();
    } else {
        records.truncate(size_cap as usize);
    }
    records
}

/// Group already-sorted records by canonical category, preserving first-seen
/// group order, and pick the intro line.
pub fn build_report(records: &[EventRecord], context: &ReportContext) -> EventReport {
    let mut groups: Vec<(String, Vec<EventRecord>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(label, _)| *label == record.category) {
            Some((_, members)) => members.push(record.clone()),
            None => groups.push((record.category.clone(), vec![record.clone()])),
        }
    }
    EventReport {
        intro: intro_line(context),
        groups,
        total: records.len(),
    }
}

pub fn render_report(report: &EventReport) -> String {
    if report.total == 0 {
        return NO_EVENTS_REPORT.to_string();
    }
    let mut body = format!("{}\n", report.intro);
    for (label, members) in &report.groups {
        body.push_str(&format!("\n{}:\n", label));
        for event in members {
            body.push_str(&format!("🎯 {}\n", event.name));
            body.push_str(&format!("📍 {}\n", event.venue));
            body.push_str(&format!(
                "📅 {}\n",
                event.start_moment.format("%B %d, %Y at %I:%M %p %Z")
            ));
            if !event.status.is_empty() {
                body.push_str(&format!(
                    "{} Status: {}\n",
                    status_marker(&event.status),
                    event.status
                ));
            }
            if let Some(range) = &event.price_range {
                body.push_str(&format!("💰 Tickets: ${:.2} - ${:.2}\n", range.min, range.max));
            }
            body.push_str(&format!("🎫 More info: {}\n\n", event.url));
        }
    }
    body
}

pub fn status_marker(code: &str) -> &'static str {
    match code.to_lowercase().as_str() {
        "onsale" => "🟢",
        "offsale" => "🔴",
        _ => "🟡",
    }
}

fn intro_line(context: &ReportContext) -> String {
    if let Some(phrase) = context.phrase {
        return format!(
            "✨ Here's what's happening {} in {}! 🎲",
            phrase, context.city
        );
    }
    if let (Some(start), Some(end)) = (context.start_date, context.end_date) {
        if start == end {
            if start == context.anchor.format("%Y-%m-%d").to_string() {
                return format!("🌟 Check out what's happening in {} today! 🎰", context.city);
            }
            if let Ok(date) = NaiveDate::parse_from_str(start, "%Y-%m-%d") {
                return format!(
                    "🌟 Here's what's happening in {} on {}! 🎰",
                    context.city,
                    date.format("%A, %B %d")
                );
            }
        }
    }
    format!("✨ Here are some exciting events coming up in {}! 🎲", context.city)
}
