#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Required construction fields were missing or empty.
    #[error("missing required arguments: {}", .missing.join(", "))]
    InvalidArgument { missing: Vec<&'static str> },

    /// A setting was present but could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    /// The API answered a data call with `503 Service Unavailable`.
    #[error("Fitbit API is unavailable (503)")]
    ServiceUnavailable,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with a non-2xx status.
    #[error("{operation} failed with status {status}: {detail}")]
    TokenExchange {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("malformed response body: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// No token has been established yet.
    #[error("no OAuth2 token has been established")]
    NotAuthenticated,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Whether this failure happened at the transport level (network or token endpoint).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::TokenExchange { .. })
    }
}
