#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub mod error;
pub mod exchange;
pub mod manager;
#[cfg(feature = "oauth")]
pub mod oauth;
#[cfg(feature = "oauth")]
pub mod pkce;
pub mod request;
pub mod response;
pub mod session;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use client::FitbitClient;
pub use config::{ALL_SCOPES, ClientConfig, ConfigBuilder, Credentials};
pub use error::Error;
pub use exchange::{HttpTokenExchanger, TokenExchanger};
pub use manager::TokenManager;
#[cfg(feature = "oauth")]
pub use oauth::AuthorizationRequest;
#[cfg(feature = "oauth")]
pub use pkce::Pkce;
pub use request::{PreparedRequest, Verb};
pub use response::{RawResponse, normalize};
pub use session::Session;
pub use token::Token;
pub use types::{Locale, UnitSystem, UserId};
