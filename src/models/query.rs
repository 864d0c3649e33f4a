/// Date window resolved from a natural time phrase. Dates are venue-local
/// calendar days in `YYYY-MM-DD` form; an absent end date means the window is
/// open-ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub raw_phrase: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// One user query as the surfaces hand it to the pipeline.
#[derive(Debug, Clone)]
pub struct EventsRequest {
    pub time_expression: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub venue: Option<String>,
    pub size: Option<i64>,
    pub include_images: bool,
}

impl Default for EventsRequest {
    fn default() -> Self {
        Self {
            time_expression: None,
            start_date: None,
            end_date: None,
            category: None,
            venue: None,
            size: None,
            include_images: true,
        }
    }
}

impl EventsRequest {
    pub fn for_phrase(phrase: impl Into<String>) -> Self {
        Self {
            time_expression: Some(phrase.into()),
            ..Self::default()
        }
    }
}

/// Per-request parameters for one Discovery API call. The client adds the
/// fixed venue params (api key, city, state) on top of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    pub size: i64,
    pub keyword: Option<String>,
    pub classification: Option<String>,
    pub start_date_time: String,
    pub end_date_time: Option<String>,
}
