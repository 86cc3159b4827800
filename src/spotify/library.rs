use std::convert::identity;

use crate::{
    Res,
    pagination::Paginator,
    scope::{RequiredScopes, Scope},
    spotify::{ids_param, paging_query, required},
    transport::Transport,
    types::{SavedAlbum, SavedTrack},
};

const MAX_LIBRARY_IDS: usize = 50;

const SAVED_TRACKS: RequiredScopes =
    RequiredScopes::new("Library::saved_tracks", &[Scope::UserLibraryRead]);
const SAVED_ALBUMS: RequiredScopes =
    RequiredScopes::new("Library::saved_albums", &[Scope::UserLibraryRead]);
const CONTAINS_TRACKS: RequiredScopes =
    RequiredScopes::new("Library::contains_tracks", &[Scope::UserLibraryRead]);
const CONTAINS_ALBUMS: RequiredScopes =
    RequiredScopes::new("Library::contains_albums", &[Scope::UserLibraryRead]);
const SAVE_TRACKS: RequiredScopes =
    RequiredScopes::new("Library::save_tracks", &[Scope::UserLibraryModify]);
const REMOVE_TRACKS: RequiredScopes =
    RequiredScopes::new("Library::remove_tracks", &[Scope::UserLibraryModify]);
const SAVE_ALBUMS: RequiredScopes =
    RequiredScopes::new("Library::save_albums", &[Scope::UserLibraryModify]);
const REMOVE_ALBUMS: RequiredScopes =
    RequiredScopes::new("Library::remove_albums", &[Scope::UserLibraryModify]);

/// The tracks and albums saved in the current user's "Your Music" library.
pub struct Library<'a> {
    transport: &'a Transport,
}

impl<'a> Library<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn saved_tracks(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Res<Paginator<'a, SavedTrack>> {
        let query = paging_query(limit, offset)?;
        SAVED_TRACKS
            .guard(self.transport.paginate("me/tracks", &query, identity))
            .await
    }

    pub async fn saved_albums(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Res<Paginator<'a, SavedAlbum>> {
        let query = paging_query(limit, offset)?;
        SAVED_ALBUMS
            .guard(self.transport.paginate("me/albums", &query, identity))
            .await
    }

    /// One flag per id, in request order.
    pub async fn contains_tracks(&self, ids: &[&str]) -> Res<Vec<bool>> {
        let query = vec![("ids", ids_param(ids, MAX_LIBRARY_IDS, "track")?)];
        CONTAINS_TRACKS
            .guard(async {
                let url = "me/tracks/contains";
                required(self.transport.get(url, &query).await?, url)
            })
            .await
    }

    /// One flag per id, in request order.
    pub async fn contains_albums(&self, ids: &[&str]) -> Res<Vec<bool>> {
        let query = vec![("ids", ids_param(ids, MAX_LIBRARY_IDS, "album")?)];
        CONTAINS_ALBUMS
            .guard(async {
                let url = "me/albums/contains";
                required(self.transport.get(url, &query).await?, url)
            })
            .await
    }

    pub async fn save_tracks(&self, ids: &[&str]) -> Res<()> {
        let query = vec![("ids", ids_param(ids, MAX_LIBRARY_IDS, "track")?)];
        SAVE_TRACKS
            .guard(self.transport.put("me/tracks", &query, None))
            .await
            .map(|_| ())
    }

    pub async fn remove_tracks(&self, ids: &[&str]) -> Res<()> {
        let query = vec![("ids", ids_param(ids, MAX_LIBRARY_IDS, "track")?)];
        REMOVE_TRACKS
            .guard(self.transport.delete("me/tracks", &query, None))
            .await
            .map(|_| ())
    }

    /// Saves up to 50 albums to the library.
    ///
    /// # Arguments
    ///
    /// * `ids` - Spotify IDs of the albums, 1 to 50
    ///
    /// # Errors
    ///
    /// - `Error::Config` - Empty or oversized batch, nothing is sent
    /// - `Error::InsufficientScope` - `user-library-modify` not granted
    pub async fn save_albums(&self, ids: &[&str]) -> Res<()> {
        let query = vec![("ids", ids_param(ids, MAX_LIBRARY_IDS, "album")?)];
        SAVE_ALBUMS
            .guard(self.transport.put("me/albums", &query, None))
            .await
            .map(|_| ())
    }

    pub async fn remove_albums(&self, ids: &[&str]) -> Res<()> {
        let query = vec![("ids", ids_param(ids, MAX_LIBRARY_IDS, "album")?)];
        REMOVE_ALBUMS
            .guard(self.transport.delete("me/albums", &query, None))
            .await
            .map(|_| ())
    }
}
