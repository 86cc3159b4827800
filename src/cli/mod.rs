//! # CLI Module
//!
//! User-facing commands of the bundled client. Every command is a thin
//! layer over the library: it loads the cached token, builds a
//! [`Transport`] that refreshes the token on demand and writes it back to
//! the cache, calls one capability of [`Spotify`] and renders the result.
//!
//! ## Commands
//!
//! - [`auth`] - Authorization-code flow through the browser and a local listener
//! - [`me`] - Profile of the current user
//! - [`saved_tracks`] / [`saved_albums`] - The user's library, page by page
//! - [`album_tracks`] - Track listing of one album
//! - [`followed_artists`] - Artists the user follows
//! - [`playlists`] - Playlists the user owns or follows
//! - [`recently_played`] / [`devices`] - Listening history and playback devices
//!
//! Failures are printed with the `error!` macro, which exits the process.
//! A missing permission is reported together with the scope to request.

mod albums;
mod auth;
mod library;
mod player;
mod playlists;
mod user;

pub use albums::{album_tracks, followed_artists};
pub use auth::auth;
pub use library::{saved_albums, saved_tracks};
pub use player::{devices, recently_played};
pub use playlists::playlists;
pub use user::me;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config, error,
    error::Error,
    management::TokenCache,
    oauth::OAuth,
    pagination::Paginator,
    spotify::Spotify,
    transport::Transport,
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Client built from the cached token and the configured credentials.
pub(crate) async fn client() -> Spotify {
    let credentials = match config::credentials() {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    };

    let cache = TokenCache::default();
    let token = match cache.load().await {
        Ok(t) => t,
        Err(e) => error!(
            "Failed to load token. Please run spotifyapi auth\n Error: {}",
            e
        ),
    };

    let http = match reqwest::Client::builder().timeout(HTTP_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => error!("Failed to build HTTP client: {}", e),
    };

    let transport = Transport::new(token)
        .with_client(http.clone())
        .with_auto_refresh(
            OAuth::new().with_client(http),
            credentials.client_id,
            credentials.client_secret,
        )
        .with_token_updater(cache.updater());

    Spotify::new(transport)
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

/// Pulls at most `max` items, updating the spinner as pages arrive.
pub(crate) async fn take<T>(
    mut paginator: Paginator<'_, T>,
    max: usize,
    pb: &ProgressBar,
) -> Vec<T> {
    let mut items = Vec::new();
    while items.len() < max {
        match paginator.next().await {
            Some(Ok(item)) => {
                items.push(item);
                match paginator.total() {
                    Some(total) => pb.set_message(format!("Fetched {}/{}", items.len(), total)),
                    None => pb.set_message(format!("Fetched {}", items.len())),
                }
            }
            Some(Err(e)) => {
                pb.finish_and_clear();
                fail(e)
            }
            None => break,
        }
    }
    pb.finish_and_clear();
    items
}

pub(crate) fn fail(e: Error) -> ! {
    match e {
        Error::InsufficientScope { .. } => error!(
            "{}\nRequest the missing scope in SPOTIFY_SCOPE and run spotifyapi auth --force",
            e
        ),
        Error::TokenRefresh { .. } | Error::ExpiredToken { .. } => {
            error!("{}\nPlease run spotifyapi auth", e)
        }
        e => error!("{}", e),
    }
}
