use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::pagination::Page;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub release_date_precision: String,
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub uri: String,
}

/// Album as returned by `GET /albums/{id}`, with the first page of its tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub label: Option<String>,
    pub popularity: Option<u32>,
    pub tracks: Page<SimplifiedTrack>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedTrack {
    pub id: Option<String>,
    pub name: String,
    pub duration_ms: u64,
    pub track_number: Option<u32>,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub album: Option<Album>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub added_at: DateTime<Utc>,
    pub track: Track,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAlbum {
    pub added_at: DateTime<Utc>,
    pub album: Album,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub is_active: bool,
    pub volume_percent: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playback {
    pub device: Option<Device>,
    #[serde(default)]
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub item: Option<Track>,
    #[serde(default)]
    pub shuffle_state: bool,
    #[serde(default)]
    pub repeat_state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralAlbumsResponse {
    pub albums: Vec<Option<FullAlbum>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralTracksResponse {
    pub tracks: Vec<Option<Track>>,
}

/// Body of `GET /artists/{id}/top-tracks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

/// Body of `GET /artists/{id}/related-artists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedArtistsResponse {
    pub artists: Vec<Artist>,
}

/// Acoustic attributes of one track.
///
/// Confidence-like measures (`acousticness`, `danceability`, `energy`,
/// `instrumentalness`, `liveness`, `speechiness`, `valence`) range from 0.0
/// to 1.0. `key` uses pitch class notation and is -1 when undetected; `mode`
/// is 1 for major and 0 for minor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    #[serde(default)]
    pub uri: String,
    pub duration_ms: u64,
    pub key: i32,
    pub mode: i32,
    pub time_signature: i32,
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub valence: f64,
    pub tempo: f64,
    #[serde(default)]
    pub track_href: String,
    #[serde(default)]
    pub analysis_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralAudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// Bar, beat or tatum of an [`AudioAnalysis`], in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: f64,
    pub duration: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub start: f64,
    pub duration: f64,
    pub confidence: f64,
    pub loudness: f64,
    pub tempo: f64,
    pub tempo_confidence: f64,
    pub key: i32,
    pub key_confidence: f64,
    pub mode: i32,
    pub mode_confidence: f64,
    pub time_signature: i32,
    pub time_signature_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub duration: f64,
    pub confidence: f64,
    pub loudness_start: f64,
    pub loudness_max: f64,
    pub loudness_max_time: f64,
    #[serde(default)]
    pub pitches: Vec<f64>,
    #[serde(default)]
    pub timbre: Vec<f64>,
}

/// Structure of a track down to the audio sample. Fields the model does not
/// cover (`meta`, `track`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAnalysis {
    #[serde(default)]
    pub bars: Vec<TimeInterval>,
    #[serde(default)]
    pub beats: Vec<TimeInterval>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub tatums: Vec<TimeInterval>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub href: Option<String>,
    pub total: u32,
}

/// Link to the tracks of a playlist plus their count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    pub href: String,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collaborative: bool,
    pub public: Option<bool>,
    pub description: Option<String>,
    pub snapshot_id: String,
    pub owner: PublicUser,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: PlaylistTracksRef,
    #[serde(default)]
    pub uri: String,
}

/// Playlist as returned by `GET /playlists/{id}`, with the first page of
/// its tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collaborative: bool,
    pub public: Option<bool>,
    pub description: Option<String>,
    pub snapshot_id: String,
    pub owner: PublicUser,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: Page<PlaylistTrack>,
    #[serde(default)]
    pub uri: String,
}

/// One entry of a playlist. `track` is `None` when the track is no longer
/// available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub added_at: Option<DateTime<Utc>>,
    pub added_by: Option<PublicUser>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<Track>,
}

/// Playlist version returned by every playlist modification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

/// Album, artist or playlist the playback was started from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "type")]
    pub context_type: String,
    pub uri: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    pub context: Option<Context>,
    pub timestamp: i64,
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub is_playing: bool,
    pub item: Option<Track>,
    #[serde(default)]
    pub currently_playing_type: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub added: String,
    pub name: String,
    pub artists: String,
    pub album: String,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub added: String,
    pub name: String,
    pub artists: String,
    pub release: String,
}

#[derive(Tabled)]
pub struct HistoryTableRow {
    pub played: String,
    pub name: String,
    pub artists: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub owner: String,
    pub tracks: u32,
    pub visibility: String,
}

#[derive(Tabled)]
pub struct DeviceTableRow {
    pub name: String,
    pub kind: String,
    pub active: String,
    pub volume: String,
}

/// Comma separated artist names, the way tables show them.
pub fn artist_names(artists: &[SimplifiedArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
