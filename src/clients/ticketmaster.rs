use serde::Deserialize;
use serenity::async_trait;

use crate::config::VenueConfig;
use crate::error::EventsError;
use crate::models::query::DiscoveryQuery;

pub const DISCOVERY_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2";

// Top-level Discovery payload. Events are kept as raw JSON values here so one
// malformed record can fail on its own during normalization instead of
// poisoning the whole decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryResponse {
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<DiscoveryEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryEmbedded {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub dates: Option<RawDates>,
    #[serde(rename = "priceRanges", default)]
    pub price_ranges: Vec<RawPriceRange>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default)]
    pub classifications: Vec<RawClassification>,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<RawEventEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEventEmbedded {
    #[serde(default)]
    pub venues: Vec<RawVenue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVenue {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDates {
    #[serde(default)]
    pub start: Option<RawStart>,
    #[serde(default)]
    pub status: Option<RawStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStart {
    #[serde(rename = "localDate", default)]
    pub local_date: Option<String>,
    #[serde(rename = "localTime", default)]
    pub local_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatus {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPriceRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub ratio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassification {
    #[serde(default)]
    pub segment: Option<RawSegment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub name: Option<String>,
}

/// The single network seam of the pipeline. Fakes implement this in tests.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self, query: &DiscoveryQuery) -> Result<DiscoveryResponse, EventsError>;
}

pub struct TicketmasterClient {
    config: VenueConfig,
    http: reqwest::Client,
}

impl TicketmasterClient {
    pub fn new(config: VenueConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn query_params(&self, query: &DiscoveryQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", self.config.api_key.clone()),
            ("city", self.config.city.clone()),
            ("stateCode", self.config.state_code.clone()),
            ("sort", "date,asc".to_string()),
            ("size", query.size.to_string()),
            ("includePictures", "yes".to_string()),
            ("startDateTime", query.start_date_time.clone()),
        ];
        if let Some(end) = &query.end_date_time {
            params.push(("endDateTime", end.clone()));
        }
        if let Some(keyword) = &query.keyword {
            params.push(("keyword", keyword.clone()));
        }
        if let Some(classification) = &query.classification {
            params.push(("classificationName", classification.clone()));
        }
        params
    }
}

#[async_trait]
impl EventSource for TicketmasterClient {
    async fn fetch_events(&self, query: &DiscoveryQuery) -> Result<DiscoveryResponse, EventsError> {
        let url = format!("{}/events", DISCOVERY_BASE_URL);
        let response = self
            .http
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| EventsError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EventsError::Transport(e.to_string()))?;

        if !status.is_success() {
            eprintln!("Ticketmaster error {}: {}", status, text);
            return Err(EventsError::UpstreamStatus(status.as_u16()));
        }

        serde_json::from_str(&text).map_err(|e| EventsError::UpstreamPayload(e.to_string()))
    }
}
