//! # OAuth Module
//!
//! Authorization-code grant against the Spotify accounts service.
//!
//! ## Flow
//!
//! 1. [`build_authorization_url`] produces the URL the user opens in a browser.
//! 2. The provider redirects to `redirect_uri`; [`parse_callback`] extracts
//!    the one-time `code` (or the reason the user declined).
//! 3. [`OAuth::request_access_token`] exchanges the code for a [`Token`].
//! 4. [`Token::refresh`] renews the access token once it expires.
//!
//! Both grants authenticate the application with an HTTP Basic header built
//! from `client_id:client_secret`. Nothing here reads the environment or
//! touches the filesystem; credentials are always explicit parameters.

mod token;

pub use token::Token;

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
use reqwest::{Client, Url, header::AUTHORIZATION};
use serde::Deserialize;

use crate::{
    Res,
    error::Error,
    scope::{Scope, join_scopes},
};

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

const STATE_LENGTH: usize = 16;

/// Base that relative redirect URLs are resolved against.
const RELATIVE_BASE: &str = "http://localhost/";

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

/// Error payload of the token endpoint, e.g.
/// `{"error": "invalid_grant", "error_description": "Invalid authorization code"}`.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Query parameters of a successful redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub code: String,
    pub state: Option<String>,
}

impl Callback {
    /// Checks that the provider echoed back the `state` sent with the
    /// authorization request.
    pub fn verify_state(&self, expected: &str) -> Res<()> {
        match self.state.as_deref() {
            Some(state) if state == expected => Ok(()),
            _ => Err(Error::StateMismatch),
        }
    }
}

/// Client for the accounts service endpoints.
#[derive(Debug, Clone)]
pub struct OAuth {
    http: Client,
    authorize_url: String,
    token_url: String,
}

impl Default for OAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl OAuth {
    pub fn new() -> Self {
        Self::with_endpoints(AUTHORIZE_URL, TOKEN_URL)
    }

    /// Points the client at other accounts endpoints (a proxy, a mock server).
    pub fn with_endpoints(authorize_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            authorize_url: authorize_url.into(),
            token_url: token_url.into(),
        }
    }

    /// Reuses an existing HTTP client (connection pool, timeouts, proxy).
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Builds the URL of the provider's consent page. Pure, no network.
    ///
    /// Parameters are emitted in the order `client_id, response_type,
    /// redirect_uri, state, scope, show_dialog`; `state` and `scope` are
    /// left out when not given.
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: Option<&str>,
        scopes: &[Scope],
        force_reapprove: bool,
    ) -> Res<String> {
        if client_id.trim().is_empty() {
            return Err(Error::Config("client_id must not be empty".to_string()));
        }
        if redirect_uri.trim().is_empty() {
            return Err(Error::Config("redirect_uri must not be empty".to_string()));
        }

        let scope = join_scopes(scopes);
        let mut params = vec![
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }
        params.push(("show_dialog", if force_reapprove { "true" } else { "false" }));

        let url = Url::parse_with_params(&self.authorize_url, &params)
            .map_err(|e| Error::Config(format!("invalid authorize endpoint: {e}")))?;
        Ok(url.into())
    }

    /// Exchanges the one-time authorization code for a token.
    ///
    /// # Arguments
    ///
    /// * `code` - The `code` parameter of the callback
    /// * `redirect_uri` - The redirect URI sent with the authorization request
    /// * `client_id`, `client_secret` - Application credentials, sent as HTTP Basic auth
    ///
    /// # Errors
    ///
    /// Every failure, including network errors and a malformed body, is an
    /// `Error::TokenExchange` carrying the provider's `error_description`,
    /// `error` or raw body.
    pub async fn request_access_token(
        &self,
        code: &str,
        redirect_uri: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Res<Token> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .token_request(&form, client_id, client_secret)
            .await
            .map_err(|(status, message)| {
                tracing::warn!(?status, %message, "authorization code exchange rejected");
                Error::TokenExchange { status, message }
            })?;

        Ok(Token::from_response(response))
    }

    pub(crate) async fn refresh_grant(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Res<TokenResponse> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        self.token_request(&form, client_id, client_secret)
            .await
            .map_err(|(status, message)| {
                tracing::warn!(?status, %message, "token refresh rejected");
                Error::TokenRefresh { status, message }
            })
    }

    /// POSTs a grant to the token endpoint. Failures are flattened into
    /// `(status, provider message)` so each grant can pick its error kind.
    async fn token_request(
        &self,
        form: &[(&str, &str)],
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, (Option<u16>, String)> {
        tracing::debug!(url = %self.token_url, grant = form[0].1, "requesting token");

        let response = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, basic_authorization(client_id, client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| (None, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| (Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => body,
            };
            return Err((Some(status.as_u16()), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            (
                Some(status.as_u16()),
                format!("malformed token response: {e}"),
            )
        })
    }
}

/// [`OAuth::authorization_url`] against the default Spotify endpoint.
pub fn build_authorization_url(
    client_id: &str,
    redirect_uri: &str,
    state: Option<&str>,
    scopes: &[Scope],
    force_reapprove: bool,
) -> Res<String> {
    OAuth::new().authorization_url(client_id, redirect_uri, state, scopes, force_reapprove)
}

/// Extracts the authorization code and state from the redirect URL.
///
/// Only the query string matters, so a bare path such as
/// `/callback?code=...&state=...` is accepted as well as a full URL.
/// An `error` parameter means the user declined and wins over anything else
/// in the query.
pub fn parse_callback(url: &str) -> Res<Callback> {
    let url = Url::parse(url)
        .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(url)))
        .map_err(|e| Error::MalformedCallback(format!("{url}: {e}")))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if code.is_none() => code = Some(value.into_owned()),
            "state" if state.is_none() => state = Some(value.into_owned()),
            "error" if error.is_none() => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(Error::AuthorizationDenied(error));
    }

    match code {
        Some(code) => Ok(Callback { code, state }),
        None => Err(Error::MalformedCallback(format!(
            "{url}: neither code nor error present"
        ))),
    }
}

/// Value of the `Authorization` header for the token endpoint.
pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Random value for the `state` parameter of the authorization request.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}
