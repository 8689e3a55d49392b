use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::exchange::{HttpTokenExchanger, TokenExchanger};
use crate::manager::TokenManager;
#[cfg(feature = "oauth")]
use crate::oauth::{self, AuthorizationRequest};
use crate::request::{self, Verb};
use crate::response::{self, RawResponse};
use crate::session::Session;
use crate::token::Token;
use crate::types::{Locale, UnitSystem, UserId};

/// Entry point for endpoint code: versioned, header-decorated calls on
/// behalf of one authenticated user.
///
/// ```rust,ignore
/// use fitbit_api::{ClientConfig, FitbitClient};
///
/// let config = ClientConfig::builder()
///     .consumer_key("22ABCD")
///     .consumer_secret("s3cr3t")
///     .access_token(stored.access_token)
///     .build()?;
/// let client = FitbitClient::new(config)?;
///
/// let profile = client.get("/user/-/profile.json", None).await?;
/// if client.is_expired().await? {
///     let token = client.refresh_access_token(&stored.refresh_token).await?;
///     // persist `token`
/// }
/// ```
pub struct FitbitClient<E = HttpTokenExchanger> {
    config: ClientConfig,
    tokens: TokenManager<E>,
}

impl FitbitClient<HttpTokenExchanger> {
    /// Create a client talking to the configured Fitbit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http_client(config, builder.build()?))
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        let exchanger = HttpTokenExchanger::new(http.clone(), config.token_url.clone());
        Self::with_exchanger(config, http, exchanger)
    }
}

impl<E: TokenExchanger> FitbitClient<E> {
    /// Create a client with a custom [`TokenExchanger`].
    #[must_use]
    pub fn with_exchanger(mut config: ClientConfig, http: reqwest::Client, exchanger: E) -> Self {
        let token = config.token.take();
        let tokens = TokenManager::new(
            config.credentials.clone(),
            token,
            exchanger,
            http,
            config.api_base_url.clone(),
        );
        Self { config, tokens }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_unit_system(&mut self, unit_system: UnitSystem) {
        self.config.unit_system = unit_system;
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.config.locale = locale;
    }

    pub fn set_user_id(&mut self, user_id: impl Into<UserId>) {
        self.config.user_id = user_id.into();
    }

    pub fn set_api_version(&mut self, version: impl Into<String>) {
        self.config.api_version = version.into();
    }

    /// `/user/{user_id}{suffix}` for the configured user.
    #[must_use]
    pub fn user_path(&self, suffix: &str) -> String {
        format!("/user/{}{suffix}", self.config.user_id)
    }

    /// The session handle currently used for API calls.
    pub async fn session(&self) -> Arc<Session> {
        self.tokens.session().await
    }

    /// Whether the held access token is past its expiry.
    ///
    /// Expiry never triggers a refresh on its own; call
    /// [`refresh_access_token`](Self::refresh_access_token) explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] if no token has been established.
    pub async fn is_expired(&self) -> Result<bool, Error> {
        self.tokens.is_expired().await
    }

    /// Exchange `refresh_token` for a new token, make it current, and return
    /// it for the caller to persist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] or [`Error::TokenExchange`] on failure. No retry
    /// is attempted.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<Token, Error> {
        self.tokens.refresh(refresh_token).await
    }

    /// `GET` `path` and normalize the response.
    ///
    /// # Errors
    ///
    /// See [`normalize`](crate::response::normalize) and [`raw_get`](Self::raw_get).
    pub async fn get(&self, path: &str, headers: Option<HeaderMap>) -> Result<Value, Error> {
        let raw = self.raw_get(path, headers).await?;
        response::normalize(Some(&raw))
    }

    /// `POST` `body` to `path` and normalize the response.
    ///
    /// # Errors
    ///
    /// See [`normalize`](crate::response::normalize) and [`raw_post`](Self::raw_post).
    pub async fn post(
        &self,
        path: &str,
        body: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<Value, Error> {
        let raw = self.raw_post(path, body, headers).await?;
        response::normalize(Some(&raw))
    }

    /// `DELETE` `path` and normalize the response.
    ///
    /// # Errors
    ///
    /// See [`normalize`](crate::response::normalize) and [`raw_delete`](Self::raw_delete).
    pub async fn delete(&self, path: &str, headers: Option<HeaderMap>) -> Result<Value, Error> {
        let raw = self.raw_delete(path, headers).await?;
        response::normalize(Some(&raw))
    }

    /// `GET` without normalization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn raw_get(&self, path: &str, headers: Option<HeaderMap>) -> Result<RawResponse, Error> {
        self.execute(Verb::Get, path, None, headers).await
    }

    /// `POST` without normalization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn raw_post(
        &self,
        path: &str,
        body: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<RawResponse, Error> {
        self.execute(Verb::Post, path, body, headers).await
    }

    /// `DELETE` without normalization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn raw_delete(
        &self,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> Result<RawResponse, Error> {
        self.execute(Verb::Delete, path, None, headers).await
    }

    async fn execute(
        &self,
        verb: Verb,
        path: &str,
        body: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<RawResponse, Error> {
        let prepared =
            request::build_request(&self.config, verb, path, body, headers.unwrap_or_default());
        let response = self.tokens.send(prepared).await?;
        tracing::debug!(status = %response.status(), path, "Fitbit API response");
        RawResponse::read(response).await
    }
}

#[cfg(feature = "oauth")]
impl<E: TokenExchanger> FitbitClient<E> {
    /// Authorization URL (with PKCE) to send the user to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if no redirect URI is configured.
    pub fn authorization_url(&self) -> Result<AuthorizationRequest, Error> {
        oauth::authorization_url(&self.config)
    }

    /// Exchange the callback `code` for a token, make it current, and return
    /// it for the caller to persist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if no redirect URI is configured, or
    /// [`Error::Http`] / [`Error::TokenExchange`] if the exchange fails.
    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<Token, Error> {
        let redirect_uri = self.config.redirect_uri().ok_or(Error::InvalidArgument {
            missing: vec!["redirect_uri"],
        })?;
        self.tokens
            .exchange_code(code, redirect_uri, code_verifier)
            .await
    }
}
