use thiserror::Error;

/// Failures the events pipeline can surface. Configuration variants are only
/// produced at startup; everything else comes back as a value inside an
/// `EventsResult` rather than aborting the invocation.
#[derive(Debug, Error)]
pub enum EventsError {
    #[error("missing required config value {0}")]
    MissingConfig(&'static str),
    #[error("invalid config value {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
    #[error("event source returned status {0}")]
    UpstreamStatus(u16),
    #[error("failed to decode event source payload: {0}")]
    UpstreamPayload(String),
    #[error("event source request failed: {0}")]
    Transport(String),
    #[error("query was canceled before the event source replied")]
    Canceled,
}
