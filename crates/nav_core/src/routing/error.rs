use thiserror::Error;

/// Error body text the provider uses when the API key quota is exhausted.
pub const RATE_LIMIT_MESSAGE: &str = "Rate Limit Exceeded";

/// Why a route request produced no polyline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteFetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider rate limit exceeded")]
    RateLimited,
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("provider response contains no route")]
    NoRoute,
    #[error("invalid route request: {0}")]
    InvalidRequest(String),
}

impl RouteFetchError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, RouteFetchError::RateLimited)
            || matches!(self, RouteFetchError::Status { status: 429, .. })
    }

    /// Log the failure at a level matching its severity. `context` names the caller.
    pub fn report(&self, context: &str) {
        match self {
            RouteFetchError::Transport(_) => log::error!("[{context}] route fetch failed: {self}"),
            _ if self.is_rate_limit() => {
                log::warn!("[{context}] route provider rate limit exceeded")
            }
            _ => log::warn!("[{context}] route fetch failed: {self}"),
        }
    }
}

#[cfg(feature = "ors")]
impl From<reqwest::Error> for RouteFetchError {
    fn from(err: reqwest::Error) -> Self {
        RouteFetchError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for RouteFetchError {
    fn from(err: serde_json::Error) -> Self {
        RouteFetchError::Malformed(err.to_string())
    }
}
