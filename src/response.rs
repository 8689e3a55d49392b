use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::error::Error;

/// Transport-level response, returned as-is by the `raw_*` client calls.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Read status, headers and the full body off a `reqwest` response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the body cannot be read.
    pub async fn read(response: reqwest::Response) -> Result<Self, Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }
}

fn empty() -> Value {
    Value::Object(Map::new())
}

/// Turn a raw response into a JSON value.
///
/// A missing response or an empty body is a valid, empty result. Only 503
/// is treated specially; any other status is parsed like a success.
///
/// # Errors
///
/// Returns [`Error::ServiceUnavailable`] for status 503 and
/// [`Error::MalformedResponse`] when a non-empty body is not JSON.
pub fn normalize(response: Option<&RawResponse>) -> Result<Value, Error> {
    let Some(response) = response else {
        return Ok(empty());
    };
    if response.status == StatusCode::SERVICE_UNAVAILABLE {
        tracing::warn!(status = %response.status, "Fitbit API unavailable");
        return Err(Error::ServiceUnavailable);
    }
    if response.body.is_empty() {
        return Ok(empty());
    }
    serde_json::from_str(&response.body).map_err(Into::into)
}
