//! # Spotify Web API
//!
//! [`Spotify`] is a thin façade composed of independent capability views,
//! each of which only depends on the shared [`Transport`]:
//!
//! ```text
//! Spotify
//!   ├── albums()    -> Albums
//!   ├── artists()   -> Artists
//!   ├── library()   -> Library
//!   ├── player()    -> Player
//!   ├── playlists() -> Playlists
//!   ├── tracks()    -> Tracks
//!   └── users()     -> Users
//!          ↓
//!      Transport (bearer, refresh, error mapping)
//!          ↓
//!      Web API
//! ```
//!
//! Every endpoint method is a single parameterized request plus a model
//! decode. Collections come back as a [`Paginator`](crate::pagination::Paginator),
//! calls that need a permission run through a [`RequiredScopes`](crate::scope::RequiredScopes)
//! guard so a 401 names the scope to request.
//!
//! Arguments are validated before any request is sent: `limit` must lie in
//! `1..=50`, `offset` needs a `limit`, and id batches are bounded by what the
//! endpoint accepts.

mod albums;
mod artists;
mod library;
mod player;
mod playlists;
mod tracks;
mod users;

pub use albums::Albums;
pub use artists::Artists;
pub use library::Library;
pub use player::{Player, RepeatState};
pub use playlists::{PlaylistDetails, Playlists};
pub use tracks::Tracks;
pub use users::Users;

use crate::{Res, error::Error, transport::{Query, Transport}};

const MAX_LIMIT: u32 = 50;

pub struct Spotify {
    transport: Transport,
}

impl Spotify {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn albums(&self) -> Albums<'_> {
        Albums::new(&self.transport)
    }

    pub fn artists(&self) -> Artists<'_> {
        Artists::new(&self.transport)
    }

    pub fn library(&self) -> Library<'_> {
        Library::new(&self.transport)
    }

    pub fn player(&self) -> Player<'_> {
        Player::new(&self.transport)
    }

    pub fn playlists(&self) -> Playlists<'_> {
        Playlists::new(&self.transport)
    }

    pub fn tracks(&self) -> Tracks<'_> {
        Tracks::new(&self.transport)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(&self.transport)
    }
}

/// `limit`/`offset` query for offset-paged endpoints.
pub(crate) fn paging_query(limit: Option<u32>, offset: Option<u32>) -> Res<Query> {
    let mut query = Query::new();
    if let Some(limit) = limit {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(Error::Config(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }
        query.push(("limit", limit.to_string()));
    }
    if let Some(offset) = offset.filter(|o| *o > 0) {
        if limit.is_none() {
            return Err(Error::Config("limit must be used with offset".to_string()));
        }
        query.push(("offset", offset.to_string()));
    }
    Ok(query)
}

/// Comma joined `ids` parameter, rejecting empty and oversized batches.
pub(crate) fn ids_param(ids: &[&str], max: usize, what: &str) -> Res<String> {
    if ids.is_empty() {
        return Err(Error::Config(format!("at least one {what} id is required")));
    }
    if ids.len() > max {
        return Err(Error::Config(format!(
            "maximum {what} id count is {max}, got {}",
            ids.len()
        )));
    }
    Ok(ids.join(","))
}

/// Unwraps the body of an endpoint that always answers with content.
pub(crate) fn required<T>(body: Option<T>, url: &str) -> Res<T> {
    body.ok_or_else(|| Error::Api {
        status: 204,
        message: format!("{url} returned no content"),
    })
}
