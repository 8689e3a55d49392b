use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::config::ClientConfig;

/// `User-Agent` sent with every API call.
pub const USER_AGENT_VALUE: &str = concat!("fitbit-api v", env!("CARGO_PKG_VERSION"));

/// Unit system negotiation header.
pub const ACCEPT_LANGUAGE: HeaderName = HeaderName::from_static("accept-language");
/// Locale negotiation header.
pub const ACCEPT_LOCALE: HeaderName = HeaderName::from_static("accept-locale");

/// HTTP verbs the API surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Delete,
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Delete => Method::DELETE,
        }
    }
}

/// A request ready to be handed to a [`Session`](crate::session::Session).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PreparedRequest {
    pub verb: Verb,
    /// Versioned path, e.g. `/1/user/-/profile.json`.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Prefix `path` with the configured API version.
///
/// The version is read on every call; changing it on the client affects
/// the next request.
#[must_use]
pub fn versioned_path(config: &ClientConfig, path: &str) -> String {
    format!("/{}{path}", config.api_version)
}

/// Headers every request carries. They override caller-supplied headers
/// with the same name.
#[must_use]
pub fn default_headers(config: &ClientConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(config.unit_system.as_header_value()),
    );
    headers.insert(
        ACCEPT_LOCALE,
        HeaderValue::from_static(config.locale.as_header_value()),
    );
    headers
}

/// Compose verb, versioned path, merged headers and body.
#[must_use]
pub fn build_request(
    config: &ClientConfig,
    verb: Verb,
    path: &str,
    body: Option<String>,
    extra_headers: HeaderMap,
) -> PreparedRequest {
    let mut headers = extra_headers;
    for (name, value) in default_headers(config) {
        if let Some(name) = name {
            headers.insert(name, value);
        }
    }

    PreparedRequest {
        verb,
        path: versioned_path(config, path),
        headers,
        body,
    }
}
