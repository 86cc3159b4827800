use tabled::Table;

use crate::{
    cli,
    types::{AlbumTableRow, TrackTableRow, artist_names},
    warning,
};

const PAGE_SIZE: u32 = 50;

pub async fn saved_tracks(max: usize) {
    let spotify = cli::client().await;
    let library = spotify.library();
    let pb = cli::spinner("Fetching saved tracks...");

    let paginator = match library.saved_tracks(Some(PAGE_SIZE), None).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            cli::fail(e)
        }
    };
    let tracks = cli::take(paginator, max, &pb).await;

    if tracks.is_empty() {
        warning!("No saved tracks found.");
        return;
    }

    let rows: Vec<TrackTableRow> = tracks
        .into_iter()
        .map(|saved| TrackTableRow {
            added: saved.added_at.format("%Y-%m-%d").to_string(),
            artists: artist_names(&saved.track.artists),
            album: saved.track.album.map(|a| a.name).unwrap_or_default(),
            name: saved.track.name,
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub async fn saved_albums(max: usize) {
    let spotify = cli::client().await;
    let library = spotify.library();
    let pb = cli::spinner("Fetching saved albums...");

    let paginator = match library.saved_albums(Some(PAGE_SIZE), None).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            cli::fail(e)
        }
    };
    let albums = cli::take(paginator, max, &pb).await;

    if albums.is_empty() {
        warning!("No saved albums found.");
        return;
    }

    let rows: Vec<AlbumTableRow> = albums
        .into_iter()
        .map(|saved| AlbumTableRow {
            added: saved.added_at.format("%Y-%m-%d").to_string(),
            artists: artist_names(&saved.album.artists),
            release: saved.album.release_date,
            name: saved.album.name,
        })
        .collect();

    println!("{}", Table::new(rows));
}
