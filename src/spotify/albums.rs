use std::convert::identity;

use crate::{
    Res,
    pagination::Paginator,
    spotify::{ids_param, paging_query, required},
    transport::Transport,
    types::{FullAlbum, SeveralAlbumsResponse, SimplifiedTrack},
};

const MAX_ALBUM_IDS: usize = 20;

/// Catalog information about albums.
pub struct Albums<'a> {
    transport: &'a Transport,
}

impl<'a> Albums<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn album(&self, id: &str) -> Res<FullAlbum> {
        let url = format!("albums/{id}");
        required(self.transport.get(&url, &[]).await?, &url)
    }

    /// Up to 20 albums in one request; unknown ids come back as `None`.
    pub async fn albums(&self, ids: &[&str]) -> Res<Vec<Option<FullAlbum>>> {
        let query = vec![("ids", ids_param(ids, MAX_ALBUM_IDS, "album")?)];
        let response: SeveralAlbumsResponse = required(self.transport.get("albums", &query).await?, "albums")?;
        Ok(response.albums)
    }

    pub async fn album_tracks(
        &self,
        id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Res<Paginator<'a, SimplifiedTrack>> {
        let query = paging_query(limit, offset)?;
        self.transport
            .paginate(&format!("albums/{id}/tracks"), &query, identity)
            .await
    }
}
