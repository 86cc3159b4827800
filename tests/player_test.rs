use serde_json::json;
use spotifyapi::{
    Error,
    oauth::Token,
    scope::Scope,
    spotify::{RepeatState, Spotify},
    transport::Transport,
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn spotify_for(server: &MockServer) -> Spotify {
    let token = Token::new("AT", "Bearer", "", 3600, "RT");
    Spotify::new(Transport::new(token).with_base_url(server.uri()))
}

async fn requests_made(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_pause_and_play_target_device() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player/pause"))
        .and(query_param("device_id", "d1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/play"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let spotify = spotify_for(&server);

    spotify.player().pause(Some("d1")).await.unwrap();
    spotify.player().play(None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[1].url.query(), None);
}

#[tokio::test]
async fn test_next_and_previous_are_posts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/me/player/next"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/me/player/previous"))
        .and(query_param("device_id", "d1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let spotify = spotify_for(&server);

    spotify.player().next(None).await.unwrap();
    spotify.player().previous(Some("d1")).await.unwrap();
}

#[tokio::test]
async fn test_seek_volume_shuffle_repeat_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player/seek"))
        .and(query_param("position_ms", "25000"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/volume"))
        .and(query_param("volume_percent", "100"))
        .and(query_param("device_id", "d1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/shuffle"))
        .and(query_param("state", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/repeat"))
        .and(query_param("state", "context"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let spotify = spotify_for(&server);
    let player = spotify.player();

    player.seek(25_000, None).await.unwrap();
    player.volume(100, Some("d1")).await.unwrap();
    player.shuffle(true, None).await.unwrap();
    player.repeat(RepeatState::Context, None).await.unwrap();
}

#[tokio::test]
async fn test_control_arguments_are_validated_locally() {
    let server = MockServer::start().await;
    let spotify = spotify_for(&server);

    assert!(matches!(
        spotify.player().seek(-1, None).await,
        Err(Error::Config(_))
    ));
    assert!(matches!(
        spotify.player().volume(101, None).await,
        Err(Error::Config(_))
    ));

    assert_eq!(requests_made(&server).await, 0);
}

#[tokio::test]
async fn test_transfer_playback_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player"))
        .and(body_json(json!({ "device_ids": ["d2"], "play": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player"))
        .and(body_json(json!({ "device_ids": ["d3"] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let spotify = spotify_for(&server);

    spotify.player().transfer_playback("d2", Some(true)).await.unwrap();
    spotify.player().transfer_playback("d3", None).await.unwrap();
}

#[tokio::test]
async fn test_control_without_scope_names_it() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player/pause"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "Permissions missing" }
        })))
        .mount(&server)
        .await;

    let err = spotify_for(&server).player().pause(None).await.unwrap_err();

    match err {
        Error::InsufficientScope { scopes, .. } => {
            assert_eq!(scopes, vec![Scope::UserModifyPlaybackState]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_currently_playing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "context": {
                "type": "playlist",
                "uri": "spotify:playlist:pl1",
                "href": "https://api.spotify.com/v1/playlists/pl1"
            },
            "timestamp": 1709287200000_i64,
            "progress_ms": 42000,
            "is_playing": true,
            "item": { "id": "t1", "name": "One", "duration_ms": 215000 },
            "currently_playing_type": "track"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let playing = spotify_for(&server)
        .player()
        .currently_playing()
        .await
        .unwrap()
        .unwrap();

    assert!(playing.is_playing);
    assert_eq!(playing.progress_ms, Some(42000));
    assert_eq!(playing.context.map(|c| c.context_type), Some("playlist".to_string()));
    assert_eq!(playing.item.map(|t| t.name), Some("One".to_string()));
}

#[tokio::test]
async fn test_nothing_currently_playing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(
        spotify_for(&server)
            .player()
            .currently_playing()
            .await
            .unwrap()
            .is_none()
    );
}
