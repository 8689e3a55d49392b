use std::future::Future;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use time::OffsetDateTime;
use url::Url;

use crate::config::Credentials;
use crate::error::Error;
use crate::token::{Token, TokenResponse};

/// Talks to the OAuth2 token endpoint.
///
/// [`HttpTokenExchanger`] is the real implementation; tests substitute a fake.
pub trait TokenExchanger: Send + Sync + 'static {
    /// Exchange a refresh token for a new token (`grant_type=refresh_token`).
    fn refresh(
        &self,
        credentials: &Credentials,
        refresh_token: &str,
    ) -> impl Future<Output = Result<Token, Error>> + Send;

    /// Exchange an authorization code for a token (`grant_type=authorization_code`).
    fn exchange_code(
        &self,
        credentials: &Credentials,
        code: &str,
        redirect_uri: &Url,
        code_verifier: &str,
    ) -> impl Future<Output = Result<Token, Error>> + Send;
}

/// `Authorization: Basic base64(key:secret)` value the token endpoint requires.
#[must_use]
pub fn basic_auth_value(credentials: &Credentials) -> String {
    let encoded = STANDARD.encode(format!(
        "{}:{}",
        credentials.consumer_key, credentials.consumer_secret
    ));
    format!("Basic {encoded}")
}

/// [`TokenExchanger`] backed by the Fitbit token endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenExchanger {
    http: reqwest::Client,
    token_url: Url,
}

impl HttpTokenExchanger {
    #[must_use]
    pub fn new(http: reqwest::Client, token_url: Url) -> Self {
        Self { http, token_url }
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    async fn request_token(
        &self,
        credentials: &Credentials,
        params: &[(&str, &str)],
        operation: &'static str,
    ) -> Result<Token, Error> {
        let issued_at = OffsetDateTime::now_utc();
        let response = self
            .http
            .post(self.token_url.clone())
            .header(reqwest::header::AUTHORIZATION, basic_auth_value(credentials))
            .form(params)
            .send()
            .await?;

        let response = Self::ensure_success(response, operation).await?;
        let body = response.json::<TokenResponse>().await?;
        Ok(body.into_token(issued_at))
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        tracing::warn!(status, operation, "Fitbit token endpoint rejected request");
        Err(Error::TokenExchange {
            operation,
            status,
            detail,
        })
    }
}

impl TokenExchanger for HttpTokenExchanger {
    async fn refresh(&self, credentials: &Credentials, refresh_token: &str) -> Result<Token, Error> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        self.request_token(credentials, &params, "token refresh")
            .await
    }

    async fn exchange_code(
        &self,
        credentials: &Credentials,
        code: &str,
        redirect_uri: &Url,
        code_verifier: &str,
    ) -> Result<Token, Error> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", credentials.consumer_key.as_str()),
            ("code_verifier", code_verifier),
        ];
        self.request_token(credentials, &params, "token exchange")
            .await
    }
}
