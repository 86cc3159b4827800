//! Authenticated access to the versioned Web API.
//!
//! [`Transport`] is the single choke-point for resource requests: it injects
//! the bearer credential, optionally renews the token first, serializes
//! bodies to JSON and classifies every non-2xx response into the crate's
//! [`Error`] taxonomy. It never retries; callers decide what to do after a
//! failure.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use reqwest::{Client, Method, Response, StatusCode, header::WWW_AUTHENTICATE};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    Res,
    error::Error,
    oauth::{OAuth, Token},
    pagination::{self, Paginator},
};

pub const API_URL: &str = "https://api.spotify.com/v1";

/// Phrase the Web API uses in the 401 message of an expired access token
/// ("The access token expired").
const EXPIRED_TOKEN_PHRASE: &str = "token expired";

/// Boxed future returned by hooks and page fetchers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Hook invoked with the renewed token after every automatic refresh, the
/// place where callers persist it.
pub type TokenUpdater = Arc<dyn Fn(Token) -> BoxFuture<'static, Res<()>> + Send + Sync>;

/// Query string parameters of a request.
pub type Query = Vec<(&'static str, String)>;

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    status: Option<u16>,
    message: String,
}

struct AutoRefresh {
    oauth: OAuth,
    client_id: String,
    client_secret: String,
}

/// Token plus the optional means to keep it fresh.
struct Session {
    token: Mutex<Token>,
    auto_refresh: Option<AutoRefresh>,
    token_updater: Option<TokenUpdater>,
    /// A refreshed token has not reached the updater yet.
    persist_pending: AtomicBool,
}

pub struct Transport {
    http: Client,
    base_url: String,
    session: Session,
}

impl Transport {
    pub fn new(token: Token) -> Self {
        Self {
            http: Client::new(),
            base_url: API_URL.to_string(),
            session: Session {
                token: Mutex::new(token),
                auto_refresh: None,
                token_updater: None,
                persist_pending: AtomicBool::new(false),
            },
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Renews the token before a request whenever it has expired.
    pub fn with_auto_refresh(
        mut self,
        oauth: OAuth,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.session.auto_refresh = Some(AutoRefresh {
            oauth,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        });
        self
    }

    pub fn with_token_updater<F>(mut self, updater: F) -> Self
    where
        F: Fn(Token) -> BoxFuture<'static, Res<()>> + Send + Sync + 'static,
    {
        self.session.token_updater = Some(Arc::new(updater));
        self
    }

    /// Snapshot of the current token.
    pub async fn token(&self) -> Token {
        self.session.token.lock().await.clone()
    }

    /// Replaces the token, e.g. after a full reauthorization.
    ///
    /// The caller owns the new token, so it is not handed to the token
    /// updater.
    pub async fn set_token(&self, token: Token) {
        let mut current = self.session.token.lock().await;
        *current = token;
        self.session.persist_pending.store(false, Ordering::SeqCst);
    }

    /// Issues one request and classifies the response.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `url` - Path relative to the API base (`me/tracks`), or an absolute
    ///   URL such as a page's `next` link, which is used verbatim
    /// * `params` - Query string parameters
    /// * `body` - Optional JSON body
    ///
    /// # Returns
    ///
    /// - `Ok(None)` - `204 No Content`, or a 2xx with an empty body
    /// - `Ok(Some(value))` - The parsed JSON of any other 2xx
    ///
    /// # Errors
    ///
    /// - `Error::TokenRefresh` - Auto-refresh is on and the token could not be renewed
    /// - `Error::ExpiredToken` - 401 caused by an expired access token
    /// - `Error::Unauthorized` - Any other 401
    /// - `Error::Api` - Any other non-2xx, with the provider's message
    /// - `Error::Http` / `Error::Decode` - Network failure or a body that is not JSON
    ///
    /// # Example
    ///
    /// ```
    /// let body = json!({ "ids": ["4iV5W9uYEdYUVa79Axb7Rh"] });
    /// transport.request(Method::PUT, "me/tracks", &[], Some(&body)).await?;
    /// ```
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        params: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Res<Option<Value>> {
        let url = self.resolve(url);
        let access_token = self.bearer().await?;

        tracing::debug!(%method, %url, "sending request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&access_token);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "received response");

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if status.is_success() {
            let bytes = response.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        Err(classify_failure(response, access_token).await)
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str, params: &[(&'static str, String)]) -> Res<Option<T>> {
        self.request(Method::GET, url, params, None)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }

    pub async fn put(&self, url: &str, params: &[(&'static str, String)], body: Option<&Value>) -> Res<Option<Value>> {
        self.request(Method::PUT, url, params, body).await
    }

    pub async fn post(&self, url: &str, params: &[(&'static str, String)], body: Option<&Value>) -> Res<Option<Value>> {
        self.request(Method::POST, url, params, body).await
    }

    pub async fn delete(&self, url: &str, params: &[(&'static str, String)], body: Option<&Value>) -> Res<Option<Value>> {
        self.request(Method::DELETE, url, params, body).await
    }

    /// GETs the first page of a collection and returns a lazy paginator
    /// that fetches following pages through this transport.
    ///
    /// `select` picks the page object out of the response for endpoints
    /// that wrap it (e.g. `{"artists": {...}}`); pass [`std::convert::identity`]
    /// otherwise.
    pub async fn paginate<'a, T, S>(
        &'a self,
        url: &str,
        params: &[(&'static str, String)],
        select: S,
    ) -> Res<Paginator<'a, T>>
    where
        T: DeserializeOwned + Send + 'a,
        S: Fn(Value) -> Value + Copy + Send + Sync + 'a,
    {
        let first = self.request(Method::GET, url, params, None).await?;
        let first = first.ok_or_else(|| Error::Api {
            status: StatusCode::NO_CONTENT.as_u16(),
            message: "expected a page, got no content".to_string(),
        })?;

        pagination::paginate(
            select(first),
            pagination::deserialize_item::<T>,
            move |next: String| async move {
                let payload = self.request(Method::GET, &next, &[], None).await?;
                payload.map(select).ok_or_else(|| Error::Api {
                    status: StatusCode::NO_CONTENT.as_u16(),
                    message: format!("expected a page at {next}, got no content"),
                })
            },
        )
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }

    /// Current access token, renewed first when auto-refresh is configured.
    ///
    /// The session lock is held across the refresh so concurrent requests
    /// never renew the same token twice. A failing token updater does not
    /// fail the request: the renewed token is still used and handed to the
    /// updater again before the next request.
    async fn bearer(&self) -> Res<String> {
        let mut token = self.session.token.lock().await;

        if let Some(refresh) = &self.session.auto_refresh {
            let refreshed = token
                .refresh(&refresh.oauth, &refresh.client_id, &refresh.client_secret)
                .await?;
            if refreshed && self.session.token_updater.is_some() {
                self.session.persist_pending.store(true, Ordering::SeqCst);
            }
        }

        if self.session.persist_pending.load(Ordering::SeqCst) {
            if let Some(updater) = &self.session.token_updater {
                match updater(token.clone()).await {
                    Ok(()) => self.session.persist_pending.store(false, Ordering::SeqCst),
                    Err(e) => {
                        tracing::warn!(error = %e, "token updater failed, retrying before the next request")
                    }
                }
            }
        }

        Ok(token.access_token().to_string())
    }
}

/// Maps a non-2xx response onto the error taxonomy.
async fn classify_failure(response: Response, access_token: String) -> Error {
    let status = response.status();
    let challenge = response
        .headers()
        .get(WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(err) => {
            if let Some(reported) = err.error.status.filter(|s| *s != status.as_u16()) {
                tracing::debug!(reported, "error payload status differs from HTTP status");
            }
            err.error.message
        }
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body,
    };

    tracing::warn!(status = status.as_u16(), %message, "request failed");

    if status == StatusCode::UNAUTHORIZED {
        if is_expired_token(&message, challenge.as_deref()) {
            return Error::ExpiredToken { access_token };
        }
        return Error::Unauthorized { message };
    }

    Error::Api {
        status: status.as_u16(),
        message,
    }
}

/// Whether a 401 was caused by token expiry.
///
/// The Web API only says so in its free-text message; an RFC 6750
/// `WWW-Authenticate` challenge mentioning expiry is honoured as well.
pub fn is_expired_token(message: &str, challenge: Option<&str>) -> bool {
    message.to_ascii_lowercase().contains(EXPIRED_TOKEN_PHRASE)
        || challenge
            .map(|c| {
                let c = c.to_ascii_lowercase();
                c.contains("invalid_token") && c.contains("expired")
            })
            .unwrap_or(false)
}
