use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Dollar range folded from all of an event's price tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub width: u32,
    pub ratio: String,
}

/// One canonical event as the pipeline hands it to callers. Immutable once
/// the normalizer has built it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub name: String,
    pub venue: String,
    pub category: String,
    pub start_moment: DateTime<Tz>,
    pub status: String,
    pub price_range: Option<PriceRange>,
    pub images: Vec<ImageRef>,
    pub url: String,
    pub source: String,
}

/// Report derived per request: intro line plus events grouped by canonical
/// category in first-seen order. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    pub intro: String,
    pub groups: Vec<(String, Vec<EventRecord>)>,
    pub total: usize,
}

/// The pipeline's outward result shape: either a success carrying the sorted
/// event list and rendered report, or a structured error.
#[derive(Debug, Clone, Serialize)]
pub struct EventsResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EventsResult {
    pub fn success(events: Vec<EventRecord>, report: String) -> Self {
        Self {
            status: "success".to_string(),
            events: Some(events),
            report: Some(report),
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            events: None,
            report: None,
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
