use tabled::Table;

use crate::{
    cli,
    types::{DeviceTableRow, HistoryTableRow, artist_names},
    warning,
};

pub async fn recently_played(max: usize) {
    let spotify = cli::client().await;
    let player = spotify.player();
    let pb = cli::spinner("Fetching listening history...");

    let paginator = match player.recently_played(Some(50), None, None).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            cli::fail(e)
        }
    };
    let history = cli::take(paginator, max, &pb).await;

    if history.is_empty() {
        warning!("Nothing played recently.");
        return;
    }

    let rows: Vec<HistoryTableRow> = history
        .into_iter()
        .map(|h| HistoryTableRow {
            played: h.played_at.format("%Y-%m-%d %H:%M").to_string(),
            artists: artist_names(&h.track.artists),
            name: h.track.name,
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub async fn devices() {
    let spotify = cli::client().await;
    let pb = cli::spinner("Fetching devices...");
    let devices = spotify.player().devices().await;
    pb.finish_and_clear();

    let devices = devices.unwrap_or_else(|e| cli::fail(e));
    if devices.is_empty() {
        warning!("No available devices.");
        return;
    }

    let rows: Vec<DeviceTableRow> = devices
        .into_iter()
        .map(|d| DeviceTableRow {
            name: d.name,
            kind: d.device_type,
            active: if d.is_active { "yes".to_string() } else { String::new() },
            volume: d.volume_percent.map(|v| format!("{v}%")).unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows));
}
