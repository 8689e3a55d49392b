use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::UserId;

/// OAuth2 token pair held by the client.
///
/// Serializable so callers can persist it between runs; the library itself
/// never writes tokens anywhere.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

fn default_token_type() -> String {
    "Bearer".to_owned()
}

fn expiry_after(issued_at: OffsetDateTime, seconds: i64) -> Option<OffsetDateTime> {
    issued_at.checked_add(Duration::seconds(seconds))
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Token {
    /// Create a token from a bare access token with no known expiry.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            refresh_token: None,
            expires_at: None,
            scope: None,
            user_id: None,
        }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    #[must_use]
    pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the expiry relative to now, as reported by `expires_in`.
    ///
    /// An offset that cannot be represented as a date leaves the expiry
    /// unknown.
    #[must_use]
    pub fn with_expires_in(mut self, seconds: i64) -> Self {
        self.expires_at = expiry_after(OffsetDateTime::now_utc(), seconds);
        self
    }

    /// Whether the token expired at or before `now`.
    ///
    /// Tokens without an expiry instant never report as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }
}

/// Body returned by the token endpoint for both grant types.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    #[serde(default = "default_token_type")]
    pub(crate) token_type: String,
    #[serde(default)]
    pub(crate) expires_in: Option<i64>,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
    #[serde(default)]
    pub(crate) scope: Option<String>,
    #[serde(default)]
    pub(crate) user_id: Option<UserId>,
}

impl TokenResponse {
    /// Turn the wire response into a [`Token`], anchoring `expires_in` at `issued_at`.
    ///
    /// An `expires_in` too large to anchor is treated as an unknown expiry.
    pub(crate) fn into_token(self, issued_at: OffsetDateTime) -> Token {
        let expires_at = self.expires_in.and_then(|secs| {
            let expires_at = expiry_after(issued_at, secs);
            if expires_at.is_none() {
                tracing::warn!(expires_in = secs, "Token endpoint returned out-of-range expires_in");
            }
            expires_at
        });
        Token {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token,
            expires_at,
            scope: self.scope,
            user_id: self.user_id,
        }
    }
}
