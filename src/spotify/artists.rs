use std::convert::identity;

use serde_json::Value;

use crate::{
    Res,
    error::Error,
    pagination::Paginator,
    scope::{RequiredScopes, Scope},
    spotify::{MAX_LIMIT, ids_param, paging_query, required},
    transport::{Query, Transport},
    types::{Album, Artist, RelatedArtistsResponse, SeveralArtistsResponse, TopTracksResponse, Track},
};

const MAX_ARTIST_IDS: usize = 50;

const FOLLOWED_ARTISTS: RequiredScopes =
    RequiredScopes::new("Artists::followed_artists", &[Scope::UserFollowRead]);

/// Catalog information about artists and the artists the user follows.
pub struct Artists<'a> {
    transport: &'a Transport,
}

impl<'a> Artists<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn artist(&self, id: &str) -> Res<Artist> {
        let url = format!("artists/{id}");
        required(self.transport.get(&url, &[]).await?, &url)
    }

    /// Several artists in one request, in request order.
    ///
    /// # Arguments
    ///
    /// * `ids` - Spotify IDs of the artists, 1 to 50
    ///
    /// # Returns
    ///
    /// One entry per id; ids that match no artist come back as `None`.
    ///
    /// # Errors
    ///
    /// `Error::Config` when `ids` is empty or longer than 50.
    pub async fn artists(&self, ids: &[&str]) -> Res<Vec<Option<Artist>>> {
        let query = vec![("ids", ids_param(ids, MAX_ARTIST_IDS, "artist")?)];
        let response: SeveralArtistsResponse = required(self.transport.get("artists", &query).await?, "artists")?;
        Ok(response.artists)
    }

    /// Most popular tracks of an artist in `country`.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the artist
    /// * `country` - ISO 3166-1 alpha-2 code, or `from_token` for the user's country
    ///
    /// # Errors
    ///
    /// `Error::Config` for an empty country code.
    ///
    /// # Example
    ///
    /// ```
    /// let top = spotify.artists().top_tracks("0OdUWJ0sBjDrqHygGUXeCF", "SE").await?;
    /// for track in &top {
    ///     println!("{} ({})", track.name, track.popularity.unwrap_or(0));
    /// }
    /// ```
    pub async fn top_tracks(&self, id: &str, country: &str) -> Res<Vec<Track>> {
        if country.trim().is_empty() {
            return Err(Error::Config("country must be defined".to_string()));
        }
        let url = format!("artists/{id}/top-tracks");
        let query = vec![("country", country.to_string())];
        let response: TopTracksResponse = required(self.transport.get(&url, &query).await?, &url)?;
        Ok(response.tracks)
    }

    /// Artists similar to the given one, based on listening history.
    pub async fn related_artists(&self, id: &str) -> Res<Vec<Artist>> {
        let url = format!("artists/{id}/related-artists");
        let response: RelatedArtistsResponse = required(self.transport.get(&url, &[]).await?, &url)?;
        Ok(response.artists)
    }

    pub async fn artist_albums(
        &self,
        id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Res<Paginator<'a, Album>> {
        let query = paging_query(limit, offset)?;
        self.transport
            .paginate(&format!("artists/{id}/albums"), &query, identity)
            .await
    }

    /// Artists followed by the current user. The page is wrapped in an
    /// `artists` object and linked by an `after` cursor.
    pub async fn followed_artists(&self, limit: Option<u32>) -> Res<Paginator<'a, Artist>> {
        let mut query: Query = vec![("type", "artist".to_string())];
        if let Some(limit) = limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(Error::Config(format!(
                    "limit must be between 1 and {MAX_LIMIT}, got {limit}"
                )));
            }
            query.push(("limit", limit.to_string()));
        }

        FOLLOWED_ARTISTS
            .guard(
                self.transport
                    .paginate("me/following", &query, |mut v: Value| {
                        v.get_mut("artists").map(Value::take).unwrap_or(Value::Null)
                    }),
            )
            .await
    }
}
