//! Error taxonomy shared by every component of the client.
//!
//! Each component raises at the point of detection; nothing in the crate
//! retries or swallows a failure. Provider messages are carried verbatim.

use thiserror::Error;

use crate::scope::Scope;

/// All failures surfaced by the client.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input to a URL or request builder (empty client id, out of
    /// range limit, missing environment variable, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The user declined the authorization request at the provider.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The redirect URL carried neither a `code` nor an `error` parameter.
    #[error("Malformed callback url: {0}")]
    MalformedCallback(String),

    /// The `state` returned in the callback does not match the one sent.
    #[error("Callback state does not match the state of the authorization request")]
    StateMismatch,

    /// The provider rejected the authorization-code grant.
    #[error("Token exchange failed{}: {message}", status_suffix(.status))]
    TokenExchange {
        status: Option<u16>,
        message: String,
    },

    /// The provider rejected the refresh-token grant.
    #[error("Token refresh failed{}: {message}", status_suffix(.status))]
    TokenRefresh {
        status: Option<u16>,
        message: String,
    },

    /// A bearer call was rejected because the access token expired.
    ///
    /// Carries the stale access token for diagnostics; it is never printed.
    #[error("The access token expired")]
    ExpiredToken { access_token: String },

    /// HTTP 401 for any reason other than token expiry.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// An operation that declares required scopes was rejected with 401.
    #[error("{operation} requires: {}", list_scopes(.scopes))]
    InsufficientScope {
        operation: String,
        scopes: Vec<Scope>,
    },

    /// Any other non-2xx provider response.
    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network level failure of the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A payload could not be (de)serialized.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::TokenExchange { status, .. } | Error::TokenRefresh { status, .. } => *status,
            Error::ExpiredToken { .. }
            | Error::Unauthorized { .. }
            | Error::InsufficientScope { .. } => Some(401),
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

fn list_scopes(scopes: &[Scope]) -> String {
    scopes
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
