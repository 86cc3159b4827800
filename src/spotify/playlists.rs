//! Playlists of the current user and of other users.
//!
//! Every modification answers with the playlist's new `snapshot_id`, which
//! can be handed back to [`Playlists::reorder_tracks`] to target a known
//! version of the playlist.

use std::{convert::identity, future::Future};

use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    Res,
    error::Error,
    pagination::Paginator,
    scope::{RequiredScopes, Scope},
    spotify::{paging_query, required},
    transport::{Query, Transport},
    types::{
        FullPlaylist, Image, PlaylistTrack, PrivateUser, SimplifiedPlaylist, SnapshotResponse,
    },
};

const MAX_PLAYLIST_URIS: usize = 100;
const MAX_PLAYLIST_OFFSET: u32 = 100_000;

const MODIFY_SCOPES: &[Scope] = &[Scope::PlaylistModifyPublic, Scope::PlaylistModifyPrivate];

const CREATE_PLAYLIST: RequiredScopes =
    RequiredScopes::new("Playlists::create_playlist", MODIFY_SCOPES);
const ADD_TRACKS: RequiredScopes = RequiredScopes::new("Playlists::add_tracks", MODIFY_SCOPES);
const REMOVE_TRACKS: RequiredScopes =
    RequiredScopes::new("Playlists::remove_tracks", MODIFY_SCOPES);
const REORDER_TRACKS: RequiredScopes =
    RequiredScopes::new("Playlists::reorder_tracks", MODIFY_SCOPES);
const REPLACE_TRACKS: RequiredScopes =
    RequiredScopes::new("Playlists::replace_tracks", MODIFY_SCOPES);
const CHANGE_DETAILS: RequiredScopes =
    RequiredScopes::new("Playlists::change_details", MODIFY_SCOPES);
const CURRENT_PLAYLISTS: RequiredScopes =
    RequiredScopes::new("Playlists::current_playlists", &[Scope::PlaylistReadPrivate]);
const USER_PLAYLISTS: RequiredScopes = RequiredScopes::new(
    "Playlists::user_playlists",
    &[Scope::PlaylistReadPrivate, Scope::PlaylistReadCollaborative],
);

/// Attributes of a playlist. Fields left `None` are not sent and keep their
/// current value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaylistDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborative: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlaylistDetails {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Collaborative playlists must be private.
    fn validate(&self) -> Res<()> {
        if self.collaborative == Some(true) && self.public != Some(false) {
            return Err(Error::Config(
                "collaborative playlists can only be private".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct Playlists<'a> {
    transport: &'a Transport,
}

impl<'a> Playlists<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Creates an empty playlist owned by the current user.
    ///
    /// The owner's id is looked up with `GET /me` first, then the playlist is
    /// created with `POST /users/{id}/playlists`.
    ///
    /// # Arguments
    ///
    /// * `details` - Attributes of the new playlist. `name` is required;
    ///   `public` defaults to `true` on the provider side, so a collaborative
    ///   playlist has to set `public: Some(false)` explicitly.
    ///
    /// # Returns
    ///
    /// The playlist just created, with an empty first page of tracks.
    ///
    /// # Errors
    ///
    /// - `Error::Config` - No name, or a collaborative playlist that is not private
    /// - `Error::InsufficientScope` - `playlist-modify-public`/`playlist-modify-private` not granted
    /// - `Error::Api` - Any other rejection by the provider
    ///
    /// # Example
    ///
    /// ```
    /// let details = PlaylistDetails {
    ///     description: Some("Fresh finds".to_string()),
    ///     ..PlaylistDetails::named("Friday")
    /// };
    /// let playlist = spotify.playlists().create_playlist(&details).await?;
    /// println!("created {}", playlist.id);
    /// ```
    pub async fn create_playlist(&self, details: &PlaylistDetails) -> Res<FullPlaylist> {
        if details.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(Error::Config("a playlist needs a name".to_string()));
        }
        details.validate()?;
        let body = serde_json::to_value(details)?;

        CREATE_PLAYLIST
            .guard(async {
                let me: PrivateUser = required(self.transport.get("me", &[]).await?, "me")?;
                let url = format!("users/{}/playlists", me.id);
                tracing::debug!(owner = %me.id, "creating playlist");
                let created = required(self.transport.post(&url, &[], Some(&body)).await?, &url)?;
                Ok(serde_json::from_value(created)?)
            })
            .await
    }

    /// Inserts tracks at `position` (zero-based), or appends them when no
    /// position is given.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Spotify ID of the playlist
    /// * `uris` - Track URIs (`spotify:track:...`), 1 to 100
    /// * `position` - Index to insert at, `None` to append
    ///
    /// # Returns
    ///
    /// The `snapshot_id` of the modified playlist.
    ///
    /// # Errors
    ///
    /// `Error::Config` for an empty or oversized batch, `Error::InsufficientScope`
    /// when the playlist modify scopes are missing.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[&str],
        position: Option<u32>,
    ) -> Res<String> {
        check_uris(uris, false)?;
        let mut body = json!({ "uris": uris });
        if let Some(position) = position {
            body["position"] = json!(position);
        }

        let url = format!("playlists/{playlist_id}/tracks");
        ADD_TRACKS
            .guard(snapshot(self.transport.post(&url, &[], Some(&body)), &url))
            .await
    }

    /// Removes every occurrence of the given track URIs.
    ///
    /// Returns the new `snapshot_id`.
    pub async fn remove_tracks(&self, playlist_id: &str, uris: &[&str]) -> Res<String> {
        check_uris(uris, false)?;
        let tracks: Vec<Value> = uris.iter().map(|uri| json!({ "uri": uri })).collect();
        let body = json!({ "tracks": tracks });

        let url = format!("playlists/{playlist_id}/tracks");
        REMOVE_TRACKS
            .guard(snapshot(self.transport.delete(&url, &[], Some(&body)), &url))
            .await
    }

    /// Moves `range_length` tracks (default 1) starting at `range_start` so
    /// they sit before the track at `insert_before`.
    ///
    /// Added-at timestamps and the adding user are kept. Passing the
    /// `snapshot_id` of a previous modification applies the move to that
    /// version of the playlist.
    pub async fn reorder_tracks(
        &self,
        playlist_id: &str,
        range_start: u32,
        insert_before: u32,
        range_length: Option<u32>,
        snapshot_id: Option<&str>,
    ) -> Res<String> {
        if range_length == Some(0) {
            return Err(Error::Config("range_length must be at least 1".to_string()));
        }
        let mut body = json!({
            "range_start": range_start,
            "insert_before": insert_before,
        });
        if let Some(range_length) = range_length {
            body["range_length"] = json!(range_length);
        }
        if let Some(snapshot_id) = snapshot_id {
            body["snapshot_id"] = json!(snapshot_id);
        }

        let url = format!("playlists/{playlist_id}/tracks");
        REORDER_TRACKS
            .guard(snapshot(self.transport.put(&url, &[], Some(&body)), &url))
            .await
    }

    /// Overwrites the tracks of a playlist. An empty `uris` clears it.
    pub async fn replace_tracks(&self, playlist_id: &str, uris: &[&str]) -> Res<()> {
        check_uris(uris, true)?;
        let body = json!({ "uris": uris });

        REPLACE_TRACKS
            .guard(
                self.transport
                    .put(&format!("playlists/{playlist_id}/tracks"), &[], Some(&body)),
            )
            .await
            .map(|_| ())
    }

    /// Changes name, visibility, collaboration or description of a playlist
    /// the user owns.
    ///
    /// # Errors
    ///
    /// `Error::Config` when nothing is set, or when the playlist would become
    /// collaborative without being private.
    pub async fn change_details(&self, playlist_id: &str, details: &PlaylistDetails) -> Res<()> {
        let body = serde_json::to_value(details)?;
        if body.as_object().is_none_or(|o| o.is_empty()) {
            return Err(Error::Config("no playlist detail to change".to_string()));
        }
        if details.collaborative == Some(true) && details.public == Some(true) {
            return Err(Error::Config(
                "collaborative playlists can only be private".to_string(),
            ));
        }

        CHANGE_DETAILS
            .guard(
                self.transport
                    .put(&format!("playlists/{playlist_id}"), &[], Some(&body)),
            )
            .await
            .map(|_| ())
    }

    /// Playlists owned or followed by the current user.
    ///
    /// # Arguments
    ///
    /// * `limit` - Page size, 1 to 50
    /// * `offset` - Index of the first playlist, at most 100,000. Requires `limit`.
    ///
    /// # Errors
    ///
    /// - `Error::Config` - Out of range `limit` or `offset`, or `offset` without `limit`
    /// - `Error::InsufficientScope` - `playlist-read-private` not granted
    pub async fn current_playlists(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Res<Paginator<'a, SimplifiedPlaylist>> {
        let query = playlist_paging_query(limit, offset)?;
        CURRENT_PLAYLISTS
            .guard(self.transport.paginate("me/playlists", &query, identity))
            .await
    }

    /// Public playlists of another user, plus the private and collaborative
    /// ones the current user may see.
    pub async fn user_playlists(
        &self,
        user_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Res<Paginator<'a, SimplifiedPlaylist>> {
        let query = playlist_paging_query(limit, offset)?;
        USER_PLAYLISTS
            .guard(
                self.transport
                    .paginate(&format!("users/{user_id}/playlists"), &query, identity),
            )
            .await
    }

    pub async fn playlist(&self, id: &str) -> Res<FullPlaylist> {
        let url = format!("playlists/{id}");
        required(self.transport.get(&url, &[]).await?, &url)
    }

    pub async fn playlist_tracks(
        &self,
        id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Res<Paginator<'a, PlaylistTrack>> {
        let query = paging_query(limit, offset)?;
        self.transport
            .paginate(&format!("playlists/{id}/tracks"), &query, identity)
            .await
    }

    /// Current cover images, largest first. Empty when the playlist has none.
    pub async fn cover_image(&self, id: &str) -> Res<Vec<Image>> {
        let url = format!("playlists/{id}/images");
        Ok(self.transport.get(&url, &[]).await?.unwrap_or_default())
    }
}

fn check_uris(uris: &[&str], allow_empty: bool) -> Res<()> {
    if uris.is_empty() && !allow_empty {
        return Err(Error::Config("at least one track uri is required".to_string()));
    }
    if uris.len() > MAX_PLAYLIST_URIS {
        return Err(Error::Config(format!(
            "maximum track uri count is {MAX_PLAYLIST_URIS}, got {}",
            uris.len()
        )));
    }
    Ok(())
}

fn playlist_paging_query(limit: Option<u32>, offset: Option<u32>) -> Res<Query> {
    if let Some(offset) = offset.filter(|o| *o > MAX_PLAYLIST_OFFSET) {
        return Err(Error::Config(format!(
            "offset must be {MAX_PLAYLIST_OFFSET} or below, got {offset}"
        )));
    }
    paging_query(limit, offset)
}

/// Awaits a playlist modification and extracts its `snapshot_id`.
async fn snapshot(
    call: impl Future<Output = Res<Option<Value>>>,
    url: &str,
) -> Res<String> {
    let response: SnapshotResponse = serde_json::from_value(required(call.await?, url)?)?;
    Ok(response.snapshot_id)
}
