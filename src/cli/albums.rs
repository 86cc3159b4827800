use tabled::{Table, Tabled};

use crate::{cli, info, types::artist_names, warning};

#[derive(Tabled)]
struct AlbumTrackRow {
    #[tabled(rename = "#")]
    number: String,
    name: String,
    artists: String,
    length: String,
}

#[derive(Tabled)]
struct FollowedArtistRow {
    name: String,
    genres: String,
}

pub async fn album_tracks(id: &str) {
    let spotify = cli::client().await;
    let albums = spotify.albums();
    let pb = cli::spinner("Fetching album...");

    let album = match albums.album(id).await {
        Ok(a) => a,
        Err(e) => {
            pb.finish_and_clear();
            cli::fail(e)
        }
    };
    let paginator = match albums.album_tracks(id, Some(50), None).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            cli::fail(e)
        }
    };
    let tracks = cli::take(paginator, usize::MAX, &pb).await;

    info!(
        "{} by {} ({})",
        album.name,
        artist_names(&album.artists),
        album.release_date
    );

    let rows: Vec<AlbumTrackRow> = tracks
        .into_iter()
        .map(|t| AlbumTrackRow {
            number: t.track_number.map(|n| n.to_string()).unwrap_or_default(),
            artists: artist_names(&t.artists),
            length: format!("{}:{:02}", t.duration_ms / 60_000, (t.duration_ms / 1000) % 60),
            name: t.name,
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub async fn followed_artists(max: usize) {
    let spotify = cli::client().await;
    let artists = spotify.artists();
    let pb = cli::spinner("Fetching followed artists...");

    let paginator = match artists.followed_artists(Some(50)).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            cli::fail(e)
        }
    };
    let mut followed = cli::take(paginator, max, &pb).await;

    if followed.is_empty() {
        warning!("You do not follow any artists.");
        return;
    }

    followed.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    let rows: Vec<FollowedArtistRow> = followed
        .into_iter()
        .map(|a| FollowedArtistRow {
            name: a.name,
            genres: a.genres.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
        })
        .collect();

    println!("{}", Table::new(rows));
}
