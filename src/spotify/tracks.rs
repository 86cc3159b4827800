use crate::{
    Res,
    spotify::{ids_param, required},
    transport::Transport,
    types::{
        AudioAnalysis, AudioFeatures, SeveralAudioFeaturesResponse, SeveralTracksResponse, Track,
    },
};

const MAX_TRACK_IDS: usize = 50;
const MAX_AUDIO_FEATURE_IDS: usize = 100;

/// Catalog information and audio analysis of tracks.
pub struct Tracks<'a> {
    transport: &'a Transport,
}

impl<'a> Tracks<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn track(&self, id: &str) -> Res<Track> {
        let url = format!("tracks/{id}");
        required(self.transport.get(&url, &[]).await?, &url)
    }

    /// Retrieves several tracks in one request.
    ///
    /// # Arguments
    ///
    /// * `ids` - Spotify IDs of the tracks, at most 50
    ///
    /// # Returns
    ///
    /// One entry per id, in request order. Ids that do not match a track
    /// come back as `None`.
    ///
    /// # Errors
    ///
    /// - `Error::Config` - `ids` is empty or holds more than 50 ids; nothing is sent
    /// - `Error::Api` - The provider rejected the request
    ///
    /// # Example
    ///
    /// ```
    /// let tracks = spotify.tracks().tracks(&["11dFghVXANMlKmJXsNCbNl"]).await?;
    /// for track in tracks.into_iter().flatten() {
    ///     println!("{}", track.name);
    /// }
    /// ```
    pub async fn tracks(&self, ids: &[&str]) -> Res<Vec<Option<Track>>> {
        let query = vec![("ids", ids_param(ids, MAX_TRACK_IDS, "track")?)];
        let response: SeveralTracksResponse = required(self.transport.get("tracks", &query).await?, "tracks")?;
        Ok(response.tracks)
    }

    pub async fn audio_features(&self, id: &str) -> Res<AudioFeatures> {
        let url = format!("audio-features/{id}");
        required(self.transport.get(&url, &[]).await?, &url)
    }

    /// Audio features of up to 100 tracks, in request order. Unknown ids
    /// come back as `None`.
    ///
    /// # Errors
    ///
    /// `Error::Config` when `ids` is empty or longer than 100.
    pub async fn several_audio_features(&self, ids: &[&str]) -> Res<Vec<Option<AudioFeatures>>> {
        let query = vec![("ids", ids_param(ids, MAX_AUDIO_FEATURE_IDS, "track")?)];
        let response: SeveralAudioFeaturesResponse =
            required(self.transport.get("audio-features", &query).await?, "audio-features")?;
        Ok(response.audio_features)
    }

    /// Low-level analysis of a track: bars, beats, sections, segments and
    /// tatums, each with a confidence between 0.0 and 1.0.
    pub async fn audio_analysis(&self, id: &str) -> Res<AudioAnalysis> {
        let url = format!("audio-analysis/{id}");
        required(self.transport.get(&url, &[]).await?, &url)
    }
}
