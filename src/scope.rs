//! OAuth permission scopes and the guard that names them when a call fails.
//!
//! Operations that need a permission declare it with a [`RequiredScopes`]
//! constant and run their request through [`RequiredScopes::guard`]. A 401
//! coming back from the transport is then reported as
//! [`Error::InsufficientScope`] naming the operation and the scopes the
//! caller has to request, instead of a bare status code.

use std::{fmt, future::Future, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Res, error::Error};

/// A single permission the user can grant to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    // Follow
    UserFollowRead,
    UserFollowModify,
    // Listening history
    UserReadRecentlyPlayed,
    UserTopRead,
    // Library
    UserLibraryRead,
    UserLibraryModify,
    // Spotify Connect
    UserReadPlaybackState,
    UserReadCurrentlyPlaying,
    UserModifyPlaybackState,
    // Playlists
    PlaylistReadCollaborative,
    PlaylistModifyPrivate,
    PlaylistModifyPublic,
    PlaylistReadPrivate,
    // Playback
    Streaming,
    AppRemoteControl,
    // Users
    UserReadEmail,
    UserReadPrivate,
    // Images
    UgcImageUpload,
}

impl Scope {
    pub const ALL: [Scope; 18] = [
        Scope::UserFollowRead,
        Scope::UserFollowModify,
        Scope::UserReadRecentlyPlayed,
        Scope::UserTopRead,
        Scope::UserLibraryRead,
        Scope::UserLibraryModify,
        Scope::UserReadPlaybackState,
        Scope::UserReadCurrentlyPlaying,
        Scope::UserModifyPlaybackState,
        Scope::PlaylistReadCollaborative,
        Scope::PlaylistModifyPrivate,
        Scope::PlaylistModifyPublic,
        Scope::PlaylistReadPrivate,
        Scope::Streaming,
        Scope::AppRemoteControl,
        Scope::UserReadEmail,
        Scope::UserReadPrivate,
        Scope::UgcImageUpload,
    ];

    /// The wire name of the scope, e.g. `user-library-read`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::UserFollowRead => "user-follow-read",
            Scope::UserFollowModify => "user-follow-modify",
            Scope::UserReadRecentlyPlayed => "user-read-recently-played",
            Scope::UserTopRead => "user-top-read",
            Scope::UserLibraryRead => "user-library-read",
            Scope::UserLibraryModify => "user-library-modify",
            Scope::UserReadPlaybackState => "user-read-playback-state",
            Scope::UserReadCurrentlyPlaying => "user-read-currently-playing",
            Scope::UserModifyPlaybackState => "user-modify-playback-state",
            Scope::PlaylistReadCollaborative => "playlist-read-collaborative",
            Scope::PlaylistModifyPrivate => "playlist-modify-private",
            Scope::PlaylistModifyPublic => "playlist-modify-public",
            Scope::PlaylistReadPrivate => "playlist-read-private",
            Scope::Streaming => "streaming",
            Scope::AppRemoteControl => "app-remote-control",
            Scope::UserReadEmail => "user-read-email",
            Scope::UserReadPrivate => "user-read-private",
            Scope::UgcImageUpload => "ugc-image-upload",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        Scope::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == needle)
            .ok_or_else(|| format!("invalid scope '{}'", s.trim()))
    }
}

impl TryFrom<String> for Scope {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.as_str().to_string()
    }
}

/// Parses a space- or comma-delimited list of scopes, e.g. the `scope`
/// field of a token response or the `SPOTIFY_SCOPE` environment variable.
///
/// Duplicates are dropped, first occurrence wins.
pub fn parse_scopes(input: &str) -> Result<Vec<Scope>, String> {
    let mut scopes = Vec::new();
    for part in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
    {
        let scope: Scope = part.parse()?;
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    Ok(scopes)
}

/// Joins scopes with a single space, the separator the authorize endpoint expects.
pub fn join_scopes(scopes: &[Scope]) -> String {
    scopes
        .iter()
        .map(Scope::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Declares the scopes an operation needs.
#[derive(Debug, Clone, Copy)]
pub struct RequiredScopes {
    pub operation: &'static str,
    pub scopes: &'static [Scope],
}

impl RequiredScopes {
    pub const fn new(operation: &'static str, scopes: &'static [Scope]) -> Self {
        Self { operation, scopes }
    }

    /// Runs `call`, translating an [`Error::Unauthorized`] into
    /// [`Error::InsufficientScope`].
    pub async fn guard<T, F>(&self, call: F) -> Res<T>
    where
        F: Future<Output = Res<T>>,
    {
        with_required_scopes(self.operation, self.scopes, call).await
    }
}

/// Awaits `call`; a 401 that is not a token expiry becomes
/// [`Error::InsufficientScope`], everything else passes through untouched.
pub async fn with_required_scopes<T, F>(operation: &str, scopes: &[Scope], call: F) -> Res<T>
where
    F: Future<Output = Res<T>>,
{
    match call.await {
        Err(Error::Unauthorized { message }) => {
            tracing::debug!(operation, %message, "translating 401 into insufficient scope");
            Err(Error::InsufficientScope {
                operation: operation.to_string(),
                scopes: scopes.to_vec(),
            })
        }
        other => other,
    }
}
