use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Res,
    error::Error,
    oauth::{OAuth, TokenResponse},
    scope::Scope,
};

/// One OAuth grant: an access token, how long it lives, and the refresh
/// token used to renew it.
///
/// The serialized form is lossless, including the creation timestamp, so a
/// token read back from a cache expires at exactly the same instant as the
/// one that was written. A cached token without `creation` is stamped with
/// the time it was read.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    access_token: String,
    token_type: String,
    #[serde(default)]
    scope: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: String,
    #[serde(default = "Utc::now")]
    creation: DateTime<Utc>,
}

impl Token {
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        scope: impl Into<String>,
        expires_in: u64,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            scope: scope.into(),
            expires_in,
            refresh_token: refresh_token.into(),
            creation: Utc::now(),
        }
    }

    /// Overrides the creation timestamp, e.g. when rebuilding a token that
    /// was obtained earlier.
    pub fn with_creation(mut self, creation: DateTime<Utc>) -> Self {
        self.creation = creation;
        self
    }

    pub(crate) fn from_response(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            scope: response.scope,
            expires_in: response.expires_in,
            refresh_token: response.refresh_token.unwrap_or_default(),
            creation: Utc::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Space-delimited list of granted permissions.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Granted permissions that this crate knows by name. Unknown names are skipped.
    pub fn scopes(&self) -> Vec<Scope> {
        self.scope
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect()
    }

    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn creation(&self) -> DateTime<Utc> {
        self.creation
    }

    /// `creation + expires_in`, saturating at the maximum representable time.
    pub fn expiry(&self) -> DateTime<Utc> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|validity| self.creation.checked_add_signed(validity))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry()
    }

    /// Renews the access token if, and only if, it has expired.
    ///
    /// Returns `Ok(false)` without any network traffic while the token is
    /// still valid, so it is safe to call before every authenticated request.
    /// On failure the token is left exactly as it was and the caller may
    /// retry or fall back to a full reauthorization.
    pub async fn refresh(&mut self, oauth: &OAuth, client_id: &str, client_secret: &str) -> Res<bool> {
        if !self.is_expired() {
            return Ok(false);
        }

        if self.refresh_token.is_empty() {
            return Err(Error::TokenRefresh {
                status: None,
                message: "token carries no refresh token".to_string(),
            });
        }

        let response = oauth
            .refresh_grant(&self.refresh_token, client_id, client_secret)
            .await?;

        // refresh_token is kept as is
        self.access_token = response.access_token;
        self.token_type = response.token_type;
        self.scope = response.scope;
        self.expires_in = response.expires_in;
        self.creation = Utc::now();

        tracing::info!(expires_in = self.expires_in, "access token refreshed");
        Ok(true)
    }

    pub fn to_json(&self) -> Res<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(contents: &str) -> Res<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &"<redacted>")
            .field("creation", &self.creation)
            .finish()
    }
}
