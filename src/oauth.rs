use crate::config::ClientConfig;
use crate::error::Error;
use crate::pkce::{self, Pkce};

/// Authorization URL with the PKCE parameters the caller must keep until the callback.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

/// Build the Fitbit authorization URL for the configured scopes.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if no redirect URI is configured.
pub fn authorization_url(config: &ClientConfig) -> Result<AuthorizationRequest, Error> {
    let redirect_uri = config.redirect_uri().ok_or(Error::InvalidArgument {
        missing: vec!["redirect_uri"],
    })?;
    let state = pkce::generate_state();
    let pkce = Pkce::generate();
    let scope = config.scopes().join(" ");

    let mut url = config.authorize_url().clone();
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", config.credentials().consumer_key())
        .append_pair("redirect_uri", redirect_uri.as_str())
        .append_pair("scope", &scope)
        .append_pair("state", &state)
        .append_pair("code_challenge", &pkce.challenge)
        .append_pair("code_challenge_method", Pkce::METHOD);

    Ok(AuthorizationRequest {
        url: url.into(),
        state,
        code_verifier: pkce.verifier,
    })
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::builder()
            .consumer_key("22ABCD")
            .consumer_secret("secret")
            .redirect_uri("https://example.com/callback".parse().unwrap())
            .scopes(vec!["activity".into(), "sleep".into()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_url_carries_pkce_and_client_parameters() {
        let req = authorization_url(&config()).unwrap();
        let url: Url = req.url.parse().unwrap();

        assert_eq!(url.host_str(), Some("www.fitbit.com"));
        assert_eq!(url.path(), "/oauth2/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("client_id"), Some("22ABCD"));
        assert_eq!(get("redirect_uri"), Some("https://example.com/callback"));
        assert_eq!(get("scope"), Some("activity sleep"));
        assert_eq!(get("state"), Some(req.state.as_str()));
        assert_eq!(get("code_challenge_method"), Some("S256"));
        assert_eq!(
            get("code_challenge"),
            Some(Pkce::from_verifier(req.code_verifier.clone()).challenge.as_str())
        );
    }

    #[test]
    fn test_unique_per_call() {
        let config = config();
        let a = authorization_url(&config).unwrap();
        let b = authorization_url(&config).unwrap();
        assert_ne!(a.state, b.state);
        assert_ne!(a.code_verifier, b.code_verifier);
    }

    #[test]
    fn test_requires_redirect_uri() {
        let config = ClientConfig::builder()
            .consumer_key("key")
            .consumer_secret("secret")
            .build()
            .unwrap();
        assert!(matches!(
            authorization_url(&config),
            Err(Error::InvalidArgument { missing }) if missing == ["redirect_uri"]
        ));
    }
}
