use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Fitbit encoded user id, as used in `/user/{id}/...` paths.
///
/// The API treats `-` as "the user the access token belongs to", so that
/// sentinel is the default and is sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Sentinel for the currently authenticated user.
    pub const CURRENT: &'static str = "-";

    #[must_use]
    pub fn current() -> Self {
        Self(Self::CURRENT.to_owned())
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.0 == Self::CURRENT
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::current()
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Measurement system requested through `Accept-Language`.
///
/// The API answers in US units for `en_US`, UK units for `en_GB` and
/// metric for anything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum UnitSystem {
    #[default]
    Us,
    Uk,
    Metric,
}

impl UnitSystem {
    /// Header value sent as `Accept-Language`.
    #[must_use]
    pub fn as_header_value(self) -> &'static str {
        match self {
            Self::Us => "en_US",
            Self::Uk => "en_GB",
            Self::Metric => "metric",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_header_value())
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" | "en_us" => Ok(Self::Us),
            "uk" | "en_gb" => Ok(Self::Uk),
            "metric" => Ok(Self::Metric),
            other => Err(format!("unknown unit system: {other}")),
        }
    }
}

/// Response language requested through `Accept-Locale`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Locale {
    #[default]
    Us,
    Uk,
    Australia,
    NewZealand,
    France,
    Germany,
    Spain,
    Japan,
}

impl Locale {
    /// Header value sent as `Accept-Locale`.
    #[must_use]
    pub fn as_header_value(self) -> &'static str {
        match self {
            Self::Us => "en_US",
            Self::Uk => "en_GB",
            Self::Australia => "en_AU",
            Self::NewZealand => "en_NZ",
            Self::France => "fr_FR",
            Self::Germany => "de_DE",
            Self::Spain => "es_ES",
            Self::Japan => "ja_JP",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_header_value())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" | "en_us" => Ok(Self::Us),
            "uk" | "en_gb" => Ok(Self::Uk),
            "au" | "en_au" => Ok(Self::Australia),
            "nz" | "en_nz" => Ok(Self::NewZealand),
            "fr" | "fr_fr" => Ok(Self::France),
            "de" | "de_de" => Ok(Self::Germany),
            "es" | "es_es" => Ok(Self::Spain),
            "jp" | "ja_jp" => Ok(Self::Japan),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}
