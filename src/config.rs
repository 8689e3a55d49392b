use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::token::Token;
use crate::types::{Locale, UnitSystem, UserId};

const DEFAULT_API_BASE_URL: &str = "https://api.fitbit.com";
const DEFAULT_TOKEN_URL: &str = "https://api.fitbit.com/oauth2/token";
const DEFAULT_AUTHORIZE_URL: &str = "https://www.fitbit.com/oauth2/authorize";

const ENV_CREDENTIALS: [&str; 2] = ["FITBIT_CLIENT_ID", "FITBIT_CLIENT_SECRET"];

/// Version segment prefixed to every API path.
pub const DEFAULT_API_VERSION: &str = "1";

/// Every scope the Fitbit Web API grants.
pub const ALL_SCOPES: &[&str] = &[
    "activity",
    "heartrate",
    "location",
    "nutrition",
    "profile",
    "settings",
    "sleep",
    "social",
    "weight",
];

/// Consumer key and secret issued for the registered application.
#[derive(Clone)]
pub struct Credentials {
    pub(crate) consumer_key: String,
    pub(crate) consumer_secret: String,
}

impl Credentials {
    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    #[must_use]
    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

/// Fully validated client configuration.
///
/// Built through [`ClientConfig::builder`] or [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) credentials: Credentials,
    pub(crate) token: Option<Token>,
    pub(crate) user_id: UserId,
    pub(crate) unit_system: UnitSystem,
    pub(crate) locale: Locale,
    pub(crate) api_version: String,
    pub(crate) api_base_url: Url,
    pub(crate) token_url: Url,
    pub(crate) authorize_url: Url,
    pub(crate) redirect_uri: Option<Url>,
    pub(crate) scopes: Vec<String>,
    pub(crate) timeout: Option<Duration>,
}

impl ClientConfig {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a configuration from environment variables.
    ///
    /// # Required env vars
    /// - `FITBIT_CLIENT_ID`: consumer key
    /// - `FITBIT_CLIENT_SECRET`: consumer secret
    ///
    /// # Optional env vars
    /// - `FITBIT_ACCESS_TOKEN` / `FITBIT_REFRESH_TOKEN`: previously persisted token
    /// - `FITBIT_USER_ID`: user id (default `-`)
    /// - `FITBIT_UNIT_SYSTEM`: `us`, `uk` or `metric`
    /// - `FITBIT_LOCALE`: e.g. `us`, `ja_JP`
    /// - `FITBIT_API_BASE_URL`, `FITBIT_TOKEN_URL`, `FITBIT_AUTHORIZE_URL`: endpoint overrides
    /// - `FITBIT_REDIRECT_URI`: OAuth2 callback URI
    /// - `FITBIT_SCOPES`: comma-separated scopes
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming every missing required
    /// variable. Once the credentials are present, an unparseable unit system
    /// or locale is [`Error::InvalidValue`] and a malformed URL override is
    /// [`Error::InvalidUrl`].
    pub fn from_env() -> Result<Self, Error> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let mut builder = Self::builder();
        if let Some(key) = var("FITBIT_CLIENT_ID") {
            builder = builder.consumer_key(key);
        }
        if let Some(secret) = var("FITBIT_CLIENT_SECRET") {
            builder = builder.consumer_secret(secret);
        }
        let missing = builder.missing(ENV_CREDENTIALS);
        if !missing.is_empty() {
            return Err(Error::InvalidArgument { missing });
        }

        if let Some(access_token) = var("FITBIT_ACCESS_TOKEN") {
            let mut token = Token::new(access_token);
            if let Some(refresh_token) = var("FITBIT_REFRESH_TOKEN") {
                token = token.with_refresh_token(refresh_token);
            }
            builder = builder.token(token);
        }
        if let Some(user_id) = var("FITBIT_USER_ID") {
            builder = builder.user_id(user_id.as_str());
        }
        if let Some(units) = var("FITBIT_UNIT_SYSTEM") {
            let units = units.parse().map_err(|_| Error::InvalidValue {
                name: "FITBIT_UNIT_SYSTEM",
                value: units,
            })?;
            builder = builder.unit_system(units);
        }
        if let Some(locale) = var("FITBIT_LOCALE") {
            let locale = locale.parse().map_err(|_| Error::InvalidValue {
                name: "FITBIT_LOCALE",
                value: locale,
            })?;
            builder = builder.locale(locale);
        }
        if let Some(url) = var("FITBIT_API_BASE_URL") {
            builder = builder.api_base_url(url.parse()?);
        }
        if let Some(url) = var("FITBIT_TOKEN_URL") {
            builder = builder.token_url(url.parse()?);
        }
        if let Some(url) = var("FITBIT_AUTHORIZE_URL") {
            builder = builder.authorize_url(url.parse()?);
        }
        if let Some(url) = var("FITBIT_REDIRECT_URI") {
            builder = builder.redirect_uri(url.parse()?);
        }
        if let Some(scopes) = var("FITBIT_SCOPES") {
            builder = builder.scopes(scopes.split(',').map(|s| s.trim().to_owned()).collect());
        }

        builder.build_with_names(ENV_CREDENTIALS)
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    #[must_use]
    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn authorize_url(&self) -> &Url {
        &self.authorize_url
    }

    #[must_use]
    pub fn redirect_uri(&self) -> Option<&Url> {
        self.redirect_uri.as_ref()
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Builder for [`ClientConfig`].
///
/// `consumer_key` and `consumer_secret` are required; everything else has a default.
///
/// ```rust,ignore
/// use fitbit_api::{ClientConfig, UnitSystem};
///
/// let config = ClientConfig::builder()
///     .consumer_key("22ABCD")
///     .consumer_secret("s3cr3t")
///     .unit_system(UnitSystem::Metric)
///     .build()?;
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct ConfigBuilder {
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    token: Option<Token>,
    user_id: Option<UserId>,
    unit_system: Option<UnitSystem>,
    locale: Option<Locale>,
    api_version: Option<String>,
    api_base_url: Option<Url>,
    token_url: Option<Url>,
    authorize_url: Option<Url>,
    redirect_uri: Option<Url>,
    scopes: Option<Vec<String>>,
    timeout: Option<Duration>,
}

impl ConfigBuilder {
    pub fn consumer_key(mut self, key: impl Into<String>) -> Self {
        self.consumer_key = Some(key.into());
        self
    }

    pub fn consumer_secret(mut self, secret: impl Into<String>) -> Self {
        self.consumer_secret = Some(secret.into());
        self
    }

    /// Token obtained earlier (e.g. loaded from the caller's own storage).
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn access_token(self, access_token: impl Into<String>) -> Self {
        self.token(Token::new(access_token))
    }

    pub fn user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = Some(unit_system);
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Override the API host (default `https://api.fitbit.com`).
    pub fn api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Override the token endpoint.
    pub fn token_url(mut self, url: Url) -> Self {
        self.token_url = Some(url);
        self
    }

    /// Override the authorization endpoint.
    pub fn authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = Some(url);
        self
    }

    pub fn redirect_uri(mut self, url: Url) -> Self {
        self.redirect_uri = Some(url);
        self
    }

    /// OAuth2 scopes requested by the authorization URL (default: all scopes).
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Per-request timeout applied to the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] listing `consumer_key` and/or
    /// `consumer_secret` when they are absent or empty.
    pub fn build(self) -> Result<ClientConfig, Error> {
        self.build_with_names(["consumer_key", "consumer_secret"])
    }

    /// `names` of the credentials that are unset or empty, in order.
    fn missing(&self, names: [&'static str; 2]) -> Vec<&'static str> {
        [&self.consumer_key, &self.consumer_secret]
            .into_iter()
            .zip(names)
            .filter_map(|(value, name)| value.as_deref().is_none_or(str::is_empty).then_some(name))
            .collect()
    }

    fn build_with_names(self, names: [&'static str; 2]) -> Result<ClientConfig, Error> {
        let missing = self.missing(names);
        let (consumer_key, consumer_secret) = match (self.consumer_key, self.consumer_secret) {
            (Some(key), Some(secret)) if missing.is_empty() => (key, secret),
            _ => return Err(Error::InvalidArgument { missing }),
        };

        Ok(ClientConfig {
            credentials: Credentials {
                consumer_key,
                consumer_secret,
            },
            token: self.token,
            user_id: self.user_id.unwrap_or_default(),
            unit_system: self.unit_system.unwrap_or_default(),
            locale: self.locale.unwrap_or_default(),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            api_base_url: match self.api_base_url {
                Some(url) => url,
                None => DEFAULT_API_BASE_URL.parse()?,
            },
            token_url: match self.token_url {
                Some(url) => url,
                None => DEFAULT_TOKEN_URL.parse()?,
            },
            authorize_url: match self.authorize_url {
                Some(url) => url,
                None => DEFAULT_AUTHORIZE_URL.parse()?,
            },
            redirect_uri: self.redirect_uri,
            scopes: self
                .scopes
                .unwrap_or_else(|| ALL_SCOPES.iter().map(|s| (*s).to_owned()).collect()),
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_of(result: Result<ClientConfig, Error>) -> Vec<&'static str> {
        match result {
            Err(Error::InvalidArgument { missing }) => missing,
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_builds_with_required_credentials_and_defaults() {
        let config = ClientConfig::builder()
            .consumer_key("key")
            .consumer_secret("secret")
            .build()
            .unwrap();

        assert_eq!(config.credentials().consumer_key(), "key");
        assert_eq!(config.credentials().consumer_secret(), "secret");
        assert_eq!(config.user_id().as_str(), "-");
        assert_eq!(config.unit_system(), UnitSystem::Us);
        assert_eq!(config.locale(), Locale::Us);
        assert_eq!(config.api_version(), "1");
        assert_eq!(config.api_base_url().as_str(), "https://api.fitbit.com/");
        assert_eq!(
            config.token_url().as_str(),
            "https://api.fitbit.com/oauth2/token"
        );
        assert_eq!(
            config.authorize_url().as_str(),
            "https://www.fitbit.com/oauth2/authorize"
        );
        assert_eq!(config.scopes().len(), ALL_SCOPES.len());
        assert!(config.token.is_none());
    }

    #[test]
    fn test_missing_key_is_named() {
        let result = ClientConfig::builder().consumer_secret("secret").build();
        assert_eq!(missing_of(result), vec!["consumer_key"]);
    }

    #[test]
    fn test_missing_secret_is_named() {
        let result = ClientConfig::builder().consumer_key("key").build();
        assert_eq!(missing_of(result), vec!["consumer_secret"]);
    }

    #[test]
    fn test_missing_both_names_both() {
        let result = ClientConfig::builder().build();
        assert_eq!(missing_of(result), vec!["consumer_key", "consumer_secret"]);
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let result = ClientConfig::builder()
            .consumer_key("")
            .consumer_secret("secret")
            .build();
        assert_eq!(missing_of(result), vec!["consumer_key"]);
    }

    #[test]
    fn test_overrides_are_kept() {
        let config = ClientConfig::builder()
            .consumer_key("key")
            .consumer_secret("secret")
            .access_token("access")
            .user_id("22ABCD")
            .unit_system(UnitSystem::Metric)
            .locale(Locale::Japan)
            .api_base_url("http://localhost:8080".parse().unwrap())
            .scopes(vec!["sleep".into()])
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.user_id().as_str(), "22ABCD");
        assert_eq!(config.unit_system(), UnitSystem::Metric);
        assert_eq!(config.locale(), Locale::Japan);
        assert_eq!(config.api_base_url().as_str(), "http://localhost:8080/");
        assert_eq!(config.scopes(), &["sleep"]);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(
            config.token.as_ref().map(|t| t.access_token.as_str()),
            Some("access")
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ClientConfig::builder()
            .consumer_key("key")
            .consumer_secret("very-secret")
            .build()
            .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    /// Environment variables are process-wide; tests that touch them take this lock.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const FITBIT_VARS: &[&str] = &[
        "FITBIT_CLIENT_ID",
        "FITBIT_CLIENT_SECRET",
        "FITBIT_ACCESS_TOKEN",
        "FITBIT_REFRESH_TOKEN",
        "FITBIT_USER_ID",
        "FITBIT_UNIT_SYSTEM",
        "FITBIT_LOCALE",
        "FITBIT_API_BASE_URL",
        "FITBIT_TOKEN_URL",
        "FITBIT_AUTHORIZE_URL",
        "FITBIT_REDIRECT_URI",
        "FITBIT_SCOPES",
    ];

    /// Run `f` with exactly `vars` set among the `FITBIT_*` variables.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: every test that reads or writes these variables holds ENV_LOCK.
        unsafe {
            for name in FITBIT_VARS {
                std::env::remove_var(name);
            }
            for (name, value) in vars {
                std::env::set_var(name, value);
            }
        }
        let result = f();
        unsafe {
            for name in FITBIT_VARS {
                std::env::remove_var(name);
            }
        }
        result
    }

    #[test]
    fn test_from_env_reports_every_missing_variable() {
        let result = with_env(&[("FITBIT_UNIT_SYSTEM", "furlongs")], ClientConfig::from_env);
        assert_eq!(
            missing_of(result),
            vec!["FITBIT_CLIENT_ID", "FITBIT_CLIENT_SECRET"]
        );
    }

    #[test]
    fn test_from_env_names_missing_secret() {
        let result = with_env(&[("FITBIT_CLIENT_ID", "22ABCD")], ClientConfig::from_env);
        assert_eq!(missing_of(result), vec!["FITBIT_CLIENT_SECRET"]);
    }

    #[test]
    fn test_from_env_rejects_unknown_unit_system() {
        let result = with_env(
            &[
                ("FITBIT_CLIENT_ID", "22ABCD"),
                ("FITBIT_CLIENT_SECRET", "secret"),
                ("FITBIT_UNIT_SYSTEM", "furlongs"),
            ],
            ClientConfig::from_env,
        );
        match result {
            Err(Error::InvalidValue { name, value }) => {
                assert_eq!(name, "FITBIT_UNIT_SYSTEM");
                assert_eq!(value, "furlongs");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_from_env_rejects_unknown_locale() {
        let result = with_env(
            &[
                ("FITBIT_CLIENT_ID", "22ABCD"),
                ("FITBIT_CLIENT_SECRET", "secret"),
                ("FITBIT_LOCALE", "tlh_KL"),
            ],
            ClientConfig::from_env,
        );
        assert!(matches!(
            result,
            Err(Error::InvalidValue { name: "FITBIT_LOCALE", .. })
        ));
    }

    #[test]
    fn test_from_env_reads_overrides() {
        let config = with_env(
            &[
                ("FITBIT_CLIENT_ID", "22ABCD"),
                ("FITBIT_CLIENT_SECRET", "secret"),
                ("FITBIT_ACCESS_TOKEN", "access"),
                ("FITBIT_REFRESH_TOKEN", "refresh"),
                ("FITBIT_USER_ID", "7XYZ"),
                ("FITBIT_UNIT_SYSTEM", "metric"),
                ("FITBIT_LOCALE", "ja_JP"),
                ("FITBIT_SCOPES", "sleep, heartrate"),
            ],
            ClientConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.credentials().consumer_key(), "22ABCD");
        assert_eq!(config.user_id().as_str(), "7XYZ");
        assert_eq!(config.unit_system(), UnitSystem::Metric);
        assert_eq!(config.locale(), Locale::Japan);
        assert_eq!(config.scopes(), &["sleep", "heartrate"]);
        let token = config.token.as_ref().unwrap();
        assert_eq!(token.access_token, "access");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
    }
}
