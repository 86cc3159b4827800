//! Local listener receiving the OAuth redirect during `auth`.
//!
//! The handler does not interpret the query; it only records the full
//! redirect URL so the auth command can run it through
//! [`parse_callback`](crate::oauth::parse_callback).

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Extension, Router, extract::RawQuery, response::Html, routing::get};
use reqwest::Url;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};

use crate::{Res, error::Error};

#[derive(Clone)]
struct CallbackContext {
    redirect_uri: String,
    received: Arc<Mutex<Option<String>>>,
}

pub struct CallbackServer {
    addr: SocketAddr,
    received: Arc<Mutex<Option<String>>>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    /// Binds `addr` and serves the path of `redirect_uri` in the background.
    pub async fn start(addr: &str, redirect_uri: &str) -> Res<Self> {
        let path = Url::parse(redirect_uri)
            .map_err(|e| Error::Config(format!("invalid redirect uri {redirect_uri}: {e}")))?
            .path()
            .to_string();

        let received = Arc::new(Mutex::new(None));
        let context = CallbackContext {
            redirect_uri: redirect_uri.trim_end_matches('/').to_string(),
            received: Arc::clone(&received),
        };

        let app = Router::new()
            .route(&path, get(callback))
            .layer(Extension(context));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("cannot bind {addr}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| Error::Config(format!("cannot bind {addr}: {e}")))?;
        tracing::debug!(%addr, %path, "callback server listening");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "callback server stopped");
            }
        });

        Ok(Self {
            addr,
            received,
            handle,
        })
    }

    /// Address actually bound, useful when started on port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Polls for the redirect URL until `timeout` elapses.
    pub async fn wait(&self, timeout: Duration) -> Option<String> {
        let start = Instant::now();

        while start.elapsed() < timeout {
            if let Some(url) = self.received.lock().await.take() {
                return Some(url);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        None
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn callback(
    RawQuery(query): RawQuery,
    Extension(context): Extension<CallbackContext>,
) -> Html<&'static str> {
    let url = match query {
        Some(query) => format!("{}?{}", context.redirect_uri, query),
        None => context.redirect_uri.clone(),
    };
    *context.received.lock().await = Some(url);

    Html("<h2>Authorization received.</h2><p>You can close this browser window.</p>")
}
