//! Configuration of the command-line client.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the platform-specific local data directory:
//!
//! - Linux: `~/.local/share/spotifyapi/.env`
//! - macOS: `~/Library/Application Support/spotifyapi/.env`
//! - Windows: `%LOCALAPPDATA%/spotifyapi/.env`
//!
//! Variables already set in the process environment win over the file. The
//! client core never calls into this module; credentials are handed to it
//! explicitly.

use std::{env, path::PathBuf};

use crate::{
    Res,
    error::Error,
    scope::{Scope, parse_scopes},
};

pub const APP_DIR: &str = "spotifyapi";

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Application credentials registered with the Spotify developer dashboard.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Directory holding the `.env` file and the token cache.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads `<data dir>/.env` into the process environment.
///
/// Creates the data directory if needed. A missing file is fine, the
/// variables may be set directly.
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(())` - The file was loaded, or there is none
/// - `Err(Error::Config)` - The directory cannot be created or the file cannot be parsed
///
/// # Example
///
/// ```
/// config::load_env().await?;
/// let credentials = config::credentials()?;
/// ```
pub async fn load_env() -> Res<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::Config(format!("cannot create {}: {e}", dir.display())))?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Config(format!("cannot load {}: {e}", path.display())))?;
    }
    Ok(())
}

/// Reads the application credentials from the environment.
///
/// # Variables
///
/// - `SPOTIFY_CLIENT_ID` - Client id of the registered application
/// - `SPOTIFY_CLIENT_SECRET` - Client secret of the registered application
/// - `SPOTIFY_REDIRECT_URI` - Redirect URI registered for the application,
///   e.g. `http://127.0.0.1:8888/callback`
///
/// # Errors
///
/// `Error::Config` naming the first variable that is missing or blank.
pub fn credentials() -> Res<Credentials> {
    Ok(Credentials {
        client_id: required_var("SPOTIFY_CLIENT_ID")?,
        client_secret: required_var("SPOTIFY_CLIENT_SECRET")?,
        redirect_uri: required_var("SPOTIFY_REDIRECT_URI")?,
    })
}

/// Address the local redirect listener binds to, `SERVER_ADDRESS`.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Scopes requested during `auth`, `SPOTIFY_SCOPE` (space or comma separated).
///
/// Defaults to the scopes the bundled commands need.
///
/// # Errors
///
/// `Error::Config` when the variable names an unknown scope.
///
/// # Example
///
/// ```
/// // SPOTIFY_SCOPE="user-library-read,playlist-read-private"
/// let scopes = config::scopes()?;
/// assert_eq!(scopes.len(), 2);
/// ```
pub fn scopes() -> Res<Vec<Scope>> {
    match env::var("SPOTIFY_SCOPE") {
        Ok(value) if !value.trim().is_empty() => parse_scopes(&value).map_err(Error::Config),
        _ => Ok(vec![
            Scope::UserReadPrivate,
            Scope::UserReadEmail,
            Scope::UserLibraryRead,
            Scope::UserReadRecentlyPlayed,
            Scope::UserReadPlaybackState,
            Scope::UserFollowRead,
            Scope::PlaylistReadPrivate,
        ]),
    }
}

fn required_var(name: &str) -> Res<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{name} must be set"))),
    }
}
