use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use url::Url;

use crate::config::Credentials;
use crate::error::Error;
use crate::exchange::TokenExchanger;
use crate::request::PreparedRequest;
use crate::session::Session;
use crate::token::Token;

/// Token and the session derived from it. `session == None` means the
/// memoized handle is invalid and must be rebuilt from `token`.
#[derive(Debug, Default)]
struct TokenState {
    token: Option<Token>,
    session: Option<Arc<Session>>,
}

/// Owns the OAuth2 token and the session built from it.
///
/// Refreshes take the write lock for the whole exchange, so at most one
/// refresh is in flight and no request runs on a session that is being
/// replaced. Requests hold the read lock while their HTTP call is pending and
/// share it with each other.
pub struct TokenManager<E> {
    credentials: Credentials,
    exchanger: E,
    http: reqwest::Client,
    api_base_url: Url,
    state: RwLock<TokenState>,
}

impl<E: TokenExchanger> TokenManager<E> {
    #[must_use]
    pub fn new(
        credentials: Credentials,
        token: Option<Token>,
        exchanger: E,
        http: reqwest::Client,
        api_base_url: Url,
    ) -> Self {
        Self {
            credentials,
            exchanger,
            http,
            api_base_url,
            state: RwLock::new(TokenState {
                token,
                session: None,
            }),
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether a token has been established (at construction or by an exchange).
    pub async fn has_token(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// The memoized session, built from the current access token on first use.
    pub async fn session(&self) -> Arc<Session> {
        self.current_session().await.1
    }

    /// Whether the held token is past its expiry instant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] if no token has been established.
    pub async fn is_expired(&self) -> Result<bool, Error> {
        self.state
            .read()
            .await
            .token
            .as_ref()
            .map(Token::is_expired)
            .ok_or(Error::NotAuthenticated)
    }

    /// Exchange `refresh_token` for a new token and make it current.
    ///
    /// The previous token is discarded and the session invalidated. The new
    /// token is returned so the caller can persist it.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the exchange unchanged; the held
    /// token is left untouched in that case.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, Error> {
        let mut state = self.state.write().await;
        let token = self
            .exchanger
            .refresh(&self.credentials, refresh_token)
            .await?;
        tracing::info!(
            expires_at = ?token.expires_at,
            rotated = token.refresh_token.is_some(),
            "Fitbit access token refreshed"
        );
        Self::replace(&mut state, token.clone());
        Ok(token)
    }

    /// Exchange an authorization code for a token and make it current.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the exchange unchanged.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &Url,
        code_verifier: &str,
    ) -> Result<Token, Error> {
        let mut state = self.state.write().await;
        let token = self
            .exchanger
            .exchange_code(&self.credentials, code, redirect_uri, code_verifier)
            .await?;
        tracing::info!(user_id = ?token.user_id, "Fitbit authorization code exchanged");
        Self::replace(&mut state, token.clone());
        Ok(token)
    }

    /// Send `request` on the current session, holding the read lock until
    /// the response headers arrive.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn send(&self, request: PreparedRequest) -> Result<reqwest::Response, Error> {
        let (_guard, session) = self.current_session().await;
        session.send(request).await
    }

    fn replace(state: &mut TokenState, token: Token) {
        state.token = Some(token);
        state.session = None;
    }

    /// The memoized session together with a read guard that keeps it
    /// current. Concurrent requests share the read lock; the write lock is
    /// only taken to build a missing session.
    async fn current_session(&self) -> (RwLockReadGuard<'_, TokenState>, Arc<Session>) {
        let guard = self.state.read().await;
        if let Some(session) = &guard.session {
            let session = Arc::clone(session);
            return (guard, session);
        }
        drop(guard);

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        // Another request may have built it while we waited.
        let session = match &state.session {
            Some(session) => Arc::clone(session),
            None => {
                let session = Arc::new(Session::new(
                    self.http.clone(),
                    self.api_base_url.clone(),
                    state.token.as_ref().map(|t| t.access_token.clone()),
                ));
                tracing::debug!(authorized = session.is_authorized(), "Built Fitbit session");
                state.session = Some(Arc::clone(&session));
                session
            }
        };
        (guard.downgrade(), session)
    }
}
