use reqwest::header::AUTHORIZATION;
use url::Url;

use crate::error::Error;
use crate::request::PreparedRequest;

/// Request-capable handle derived from the current access token.
///
/// Sessions are built by the [`TokenManager`](crate::manager::TokenManager)
/// and replaced whenever the token changes; they never outlive the token
/// they were built from.
#[derive(Clone)]
pub struct Session {
    http: reqwest::Client,
    api_base_url: Url,
    access_token: Option<String>,
}

impl Session {
    pub(crate) fn new(http: reqwest::Client, api_base_url: Url, access_token: Option<String>) -> Self {
        Self {
            http,
            api_base_url,
            access_token,
        }
    }

    pub(crate) fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.access_token.is_some()
    }

    /// Issue `request` against the API host.
    ///
    /// Without an access token the request goes out unauthenticated and the
    /// API is expected to reject it. With one, the bearer header replaces any
    /// `Authorization` header the caller supplied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the path cannot be joined onto the
    /// base URL, or [`Error::Http`] on network failure.
    pub async fn send(&self, request: PreparedRequest) -> Result<reqwest::Response, Error> {
        let url = self.api_base_url.join(&request.path)?;
        tracing::debug!(method = ?request.verb, url = %url, "Sending Fitbit API request");

        let mut headers = request.headers;
        if self.access_token.is_some() {
            headers.remove(AUTHORIZATION);
        }
        let mut builder = self.http.request(request.verb.into(), url).headers(headers);
        if let Some(token) = self.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        builder.send().await.map_err(Into::into)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("authorized", &self.is_authorized())
            .finish_non_exhaustive()
    }
}
