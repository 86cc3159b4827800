use std::fmt;

use reqwest::Method;
use serde_json::{Value, json};

use crate::{
    Res,
    error::Error,
    pagination::Paginator,
    scope::{RequiredScopes, Scope},
    spotify::{MAX_LIMIT, required},
    transport::{Query, Transport},
    types::{CurrentlyPlaying, Device, DevicesResponse, PlayHistory, Playback},
};

const DEVICES: RequiredScopes =
    RequiredScopes::new("Player::devices", &[Scope::UserReadPlaybackState]);
const PLAYBACK: RequiredScopes =
    RequiredScopes::new("Player::playback", &[Scope::UserReadPlaybackState]);
const RECENTLY_PLAYED: RequiredScopes =
    RequiredScopes::new("Player::recently_played", &[Scope::UserReadRecentlyPlayed]);
const CURRENTLY_PLAYING: RequiredScopes = RequiredScopes::new(
    "Player::currently_playing",
    &[Scope::UserReadCurrentlyPlaying, Scope::UserReadPlaybackState],
);
const CONTROL: RequiredScopes =
    RequiredScopes::new("Player::control", &[Scope::UserModifyPlaybackState]);

/// Repeat mode of the playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatState {
    /// Repeat the current track.
    Track,
    /// Repeat the current album, playlist or artist.
    Context,
    Off,
}

impl RepeatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatState::Track => "track",
            RepeatState::Context => "context",
            RepeatState::Off => "off",
        }
    }
}

impl fmt::Display for RepeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's playback state, listening history and playback controls.
///
/// Every control takes an optional `device_id`; without one the user's
/// currently active device is targeted. Controls answer with no content and
/// need the `user-modify-playback-state` scope.
pub struct Player<'a> {
    transport: &'a Transport,
}

impl<'a> Player<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn devices(&self) -> Res<Vec<Device>> {
        DEVICES
            .guard(async {
                let url = "me/player/devices";
                let response: DevicesResponse = required(self.transport.get(url, &[]).await?, url)?;
                Ok(response.devices)
            })
            .await
    }

    /// Current playback, `None` when nothing is playing (204).
    pub async fn playback(&self) -> Res<Option<Playback>> {
        PLAYBACK.guard(self.transport.get("me/player", &[])).await
    }

    /// Recently played tracks, newest first. `after` and `before` are Unix
    /// timestamps in milliseconds and exclude each other.
    pub async fn recently_played(
        &self,
        limit: Option<u32>,
        after: Option<i64>,
        before: Option<i64>,
    ) -> Res<Paginator<'a, PlayHistory>> {
        let mut query = Query::new();
        if let Some(limit) = limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(Error::Config(format!(
                    "limit must be between 1 and {MAX_LIMIT}, got {limit}"
                )));
            }
            query.push(("limit", limit.to_string()));
        }
        match (after, before) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "can only specify after or before, not both".to_string(),
                ));
            }
            (Some(after), None) => query.push(("after", after.to_string())),
            (None, Some(before)) => query.push(("before", before.to_string())),
            (None, None) => {}
        }

        RECENTLY_PLAYED
            .guard(
                self.transport
                    .paginate("me/player/recently-played", &query, std::convert::identity),
            )
            .await
    }

    /// What is playing right now, `None` when nothing is (204).
    pub async fn currently_playing(&self) -> Res<Option<CurrentlyPlaying>> {
        CURRENTLY_PLAYING
            .guard(self.transport.get("me/player/currently-playing", &[]))
            .await
    }

    pub async fn pause(&self, device_id: Option<&str>) -> Res<()> {
        self.control(Method::PUT, "me/player/pause", device_query(device_id), None)
            .await
    }

    /// Resumes the current playback.
    pub async fn play(&self, device_id: Option<&str>) -> Res<()> {
        self.control(Method::PUT, "me/player/play", device_query(device_id), None)
            .await
    }

    /// Seeks to `position_ms` in the current track.
    ///
    /// A position past the end of the track skips to the next one.
    ///
    /// # Arguments
    ///
    /// * `position_ms` - Position in milliseconds, must not be negative
    /// * `device_id` - Target device, `None` for the active one
    ///
    /// # Errors
    ///
    /// `Error::Config` for a negative position; nothing is sent.
    pub async fn seek(&self, position_ms: i64, device_id: Option<&str>) -> Res<()> {
        if position_ms < 0 {
            return Err(Error::Config(format!(
                "position_ms must not be negative, got {position_ms}"
            )));
        }
        let mut query = vec![("position_ms", position_ms.to_string())];
        query.extend(device_query(device_id));
        self.control(Method::PUT, "me/player/seek", query, None).await
    }

    /// Sets the volume of the device, `0..=100` percent.
    ///
    /// # Errors
    ///
    /// `Error::Config` when `volume_percent` is above 100.
    pub async fn volume(&self, volume_percent: u32, device_id: Option<&str>) -> Res<()> {
        if volume_percent > 100 {
            return Err(Error::Config(format!(
                "volume_percent must be between 0 and 100, got {volume_percent}"
            )));
        }
        let mut query = vec![("volume_percent", volume_percent.to_string())];
        query.extend(device_query(device_id));
        self.control(Method::PUT, "me/player/volume", query, None).await
    }

    /// Skips to the next track in the queue.
    pub async fn next(&self, device_id: Option<&str>) -> Res<()> {
        self.control(Method::POST, "me/player/next", device_query(device_id), None)
            .await
    }

    pub async fn previous(&self, device_id: Option<&str>) -> Res<()> {
        self.control(Method::POST, "me/player/previous", device_query(device_id), None)
            .await
    }

    pub async fn shuffle(&self, state: bool, device_id: Option<&str>) -> Res<()> {
        let mut query = vec![("state", state.to_string())];
        query.extend(device_query(device_id));
        self.control(Method::PUT, "me/player/shuffle", query, None).await
    }

    pub async fn repeat(&self, state: RepeatState, device_id: Option<&str>) -> Res<()> {
        let mut query = vec![("state", state.as_str().to_string())];
        query.extend(device_query(device_id));
        self.control(Method::PUT, "me/player/repeat", query, None).await
    }

    /// Moves playback to `device_id`.
    ///
    /// With `play` set to `Some(true)` playback starts on the new device;
    /// otherwise the current play state is kept.
    pub async fn transfer_playback(&self, device_id: &str, play: Option<bool>) -> Res<()> {
        let mut body = json!({ "device_ids": [device_id] });
        if let Some(play) = play {
            body["play"] = json!(play);
        }
        self.control(Method::PUT, "me/player", Query::new(), Some(body))
            .await
    }

    async fn control(&self, method: Method, url: &str, query: Query, body: Option<Value>) -> Res<()> {
        tracing::debug!(%method, url, "playback control");
        CONTROL
            .guard(self.transport.request(method, url, &query, body.as_ref()))
            .await
            .map(|_| ())
    }
}

fn device_query(device_id: Option<&str>) -> Query {
    device_id
        .map(|id| vec![("device_id", id.to_string())])
        .unwrap_or_default()
}
