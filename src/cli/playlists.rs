use tabled::Table;

use crate::{cli, types::PlaylistTableRow, warning};

const PAGE_SIZE: u32 = 50;

/// Lists the playlists the current user owns or follows.
pub async fn playlists(max: usize) {
    let spotify = cli::client().await;
    let pb = cli::spinner("Fetching playlists...");

    let paginator = match spotify.playlists().current_playlists(Some(PAGE_SIZE), None).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            cli::fail(e)
        }
    };
    let playlists = cli::take(paginator, max, &pb).await;

    if playlists.is_empty() {
        warning!("No playlists found.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            owner: p.owner.display_name.unwrap_or(p.owner.id),
            tracks: p.tracks.total,
            visibility: match (p.collaborative, p.public) {
                (true, _) => "collaborative",
                (false, Some(true)) => "public",
                (false, Some(false)) => "private",
                (false, None) => "-",
            }
            .to_string(),
            name: p.name,
        })
        .collect();

    println!("{}", Table::new(rows));
}
