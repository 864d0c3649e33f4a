use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use tokio::sync::oneshot;

use crate::clients::ticketmaster::EventSource;
use crate::config::VenueConfig;
use crate::error::EventsError;
use crate::models::event::EventsResult;
use crate::models::query::{EventsRequest, TimeWindow};
use crate::service::normalize_service;
use crate::service::query_service;
use crate::service::report_service::{self, ReportContext, NO_EVENTS_REPORT};
use crate::service::time_service;

/// The whole pipeline behind one call: resolve the window, make the single
/// Discovery request, normalize record by record, then aggregate and render.
/// Stateless per invocation; safe to run invocations concurrently.
pub struct EventService {
    source: Arc<dyn EventSource>,
    config: VenueConfig,
}

impl EventService {
    pub fn new(source: Arc<dyn EventSource>, config: VenueConfig) -> Self {
        Self { source, config }
    }

    pub async fn get_events(&self, request: &EventsRequest, anchor: DateTime<Tz>) -> EventsResult {
        self.run(request, anchor, None).await
    }

    /// Same pipeline, but the network call races a cancellation signal. A
    /// fired (or dropped) sender aborts the invocation with a structured
    /// error; nothing outside the invocation is touched either way.
    pub async fn get_events_with_cancel(
        &self,
        request: &EventsRequest,
        anchor: DateTime<Tz>,
        cancel: oneshot::Receiver<()>,
    ) -> EventsResult {
        self.run(request, anchor, Some(cancel)).await
    }

    async fn run(
        &self,
        request: &EventsRequest,
        anchor: DateTime<Tz>,
        cancel: Option<oneshot::Receiver<()>>,
    ) -> EventsResult {
        let window = resolve_window(request, anchor);
        let query = query_service::build_query(
            &window,
            request.category.as_deref(),
            request.venue.as_deref(),
            request.size,
            anchor,
        );

        let fetched = match cancel {
            Some(cancel) => tokio::select! {
                _ = cancel => Err(EventsError::Canceled),
                fetched = self.source.fetch_events(&query) => fetched,
            },
            None => self.source.fetch_events(&query).await,
        };
        let payload = match fetched {
            Ok(payload) => payload,
            Err(err) => return EventsResult::error(err.to_string()),
        };

        let raw_events = payload
            .embedded
            .map(|embedded| embedded.events)
            .unwrap_or_default();
        if raw_events.is_empty() {
            return EventsResult::success(Vec::new(), NO_EVENTS_REPORT.to_string());
        }

        let tz = self.config.timezone;
        let mut records = Vec::with_capacity(raw_events.len());
        for value in &raw_events {
            match normalize_service::normalize_record(value, request.include_images, tz) {
                Ok(record) => records.push(record),
                Err(err) => eprintln!("Skipping event record: {}", err),
            }
        }

        let size_cap = request.size.unwrap_or(query_service::DEFAULT_PAGE_SIZE);
        let records = report_service::sort_and_cap(records, size_cap);
        let context = ReportContext {
            phrase: request.time_expression.as_deref(),
            start_date: Some(window.start_date.as_str()),
            end_date: window.end_date.as_deref(),
            anchor,
            city: &self.config.city,
        };
        let report = report_service::build_report(&records, &context);
        let rendered = report_service::render_report(&report);
        EventsResult::success(records, rendered)
    }
}

/// A matched phrase always wins. An unmatched phrase (open window, no end
/// date) yields to caller-supplied explicit dates when there are any.
fn resolve_window(request: &EventsRequest, anchor: DateTime<Tz>) -> TimeWindow {
    if let Some(phrase) = request.time_expression.as_deref() {
        let window = time_service::resolve_time_expression(phrase, anchor);
        let matched = window.end_date.is_some();
        let explicit = request.start_date.is_some() || request.end_date.is_some();
        if matched || !explicit {
            return window;
        }
    }
    TimeWindow {
        raw_phrase: request.time_expression.clone().unwrap_or_default(),
        start_date: request
            .start_date
            .clone()
            .unwrap_or_else(|| anchor.format("%Y-%m-%d").to_string()),
        end_date: request.end_date.clone(),
    }
}
