use super::*;
use crate::config::ServerSettings;
use mockito::Matcher;

fn api_for(url: String) -> HttpPlayerApi {
    let settings = ServerSettings {
        url,
        ..ServerSettings::default()
    };
    HttpPlayerApi::new(&settings).unwrap()
}

const FILES_BODY: &str = r#"{
    "files": [
        {"filename": "a.mp3", "filepath": "uploads/a.mp3", "title": "Alpha", "artist": "Ann",
         "duration": 187, "duration_str": "3:07", "size": 4096},
        {"filename": "b.mp3", "title": "Beta", "artist": "Bo", "duration": 60, "duration_str": "1:00", "size": 10}
    ],
    "current_song": null,
    "is_playing": false,
    "current_index": 0,
    "volume": 0.7,
    "shuffle": true,
    "repeat": false
}"#;

#[test]
fn format_volume_always_has_a_decimal_point() {
    assert_eq!(format_volume(1.0), "1.0");
    assert_eq!(format_volume(0.0), "0.0");
    assert_eq!(format_volume(1.35), "1.35");
    assert_eq!(format_volume(0.05), "0.05");
}

#[test]
fn control_commands_map_to_api_paths() {
    assert_eq!(ControlCommand::Play(3).path_segments(), ["api", "play", "3"]);
    assert_eq!(ControlCommand::Pause.path_segments(), ["api", "pause"]);
    assert_eq!(
        ControlCommand::ToggleShuffle.path_segments(),
        ["api", "toggle_shuffle"]
    );
    assert_eq!(
        ControlCommand::Delete("x.mp3".into()).path_segments(),
        ["api", "delete", "x.mp3"]
    );
}

#[test]
fn parse_base_url_rejects_non_http_urls() {
    assert!(parse_base_url("http://raspberrypi.local:5001").is_ok());
    assert!(parse_base_url("  https://pi/ ").is_ok());
    assert!(matches!(
        parse_base_url("ftp://pi"),
        Err(crate::error::RemoteError::InvalidUrl(_))
    ));
    assert!(parse_base_url("not a url").is_err());
}

#[test]
fn fetch_files_decodes_playlist_and_state() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/files")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FILES_BODY)
        .create();

    let mut api = api_for(server.url());
    let snap = api.fetch_files().unwrap();
    mock.assert();

    let files = snap.files.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].title, "Alpha");
    assert_eq!(files[0].duration, "3:07");
    assert_eq!(files[0].duration_secs, 187);
    assert_eq!(files[0].size, 4096);
    assert_eq!(snap.state.current_track, None);
    assert_eq!(snap.state.current_index, 0);
    assert!(snap.state.shuffle);
    assert_eq!(snap.playlist_length, None);
}

#[test]
fn fetch_status_reads_playlist_length_without_files() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"current_song": {"filename": "a.mp3", "title": "Alpha"}, "is_playing": true,
                "current_index": 0, "volume": 0.5, "shuffle": false, "repeat": true,
                "playlist_length": 4}"#,
        )
        .create();

    let mut api = api_for(server.url());
    let snap = api.fetch_status().unwrap();
    mock.assert();

    assert!(snap.files.is_none());
    assert_eq!(snap.playlist_length, Some(4));
    assert!(snap.state.is_playing);
    assert!(snap.state.repeat);
    assert_eq!(snap.state.volume, 0.5);
    let current = snap.state.current_track.unwrap();
    assert_eq!(current.artist, "");
    assert_eq!(current.size, 0);
}

#[test]
fn volume_is_sent_unmodified_with_decimal_point() {
    let mut server = mockito::Server::new();
    let over = server
        .mock("GET", "/api/volume/1.35")
        .with_status(200)
        .with_body(r#"{"success": true, "volume": 1.0}"#)
        .create();
    let whole = server
        .mock("GET", "/api/volume/1.0")
        .with_status(200)
        .with_body(r#"{"success": true, "volume": 1.0}"#)
        .create();

    let mut api = api_for(server.url());
    let reply = api.send_control(&ControlCommand::Volume(1.35)).unwrap();
    assert!(reply.success);
    assert_eq!(reply.volume, Some(1.0));
    api.send_control(&ControlCommand::Volume(1.0)).unwrap();

    over.assert();
    whole.assert();
}

#[test]
fn error_bodies_are_decoded_despite_status_code() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/play/9")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Invalid song index"}"#)
        .create();

    let mut api = api_for(server.url());
    let reply = api.send_control(&ControlCommand::Play(9)).unwrap();
    mock.assert();

    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Invalid song index"));
}

#[test]
fn non_json_body_is_a_transport_error() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/stop")
        .with_status(500)
        .with_body("<html>Internal Server Error</html>")
        .create();

    let mut api = api_for(server.url());
    let err = api.send_control(&ControlCommand::Stop).unwrap_err();
    mock.assert();
    assert!(matches!(err, crate::error::RemoteError::Transport(_)));
    assert!(!err.is_logical());
}

#[test]
fn delete_percent_encodes_the_filename() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/api/delete/my%20song\.mp3$".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create();

    let mut api = api_for(server.url());
    let reply = api
        .send_control(&ControlCommand::Delete("my song.mp3".into()))
        .unwrap();
    mock.assert();
    assert!(reply.success);
}

#[test]
fn base_url_sub_path_is_kept() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/player/api/status")
        .with_status(200)
        .with_body(r#"{"is_playing": false, "current_index": -1}"#)
        .create();

    let mut api = api_for(format!("{}/player/", server.url()));
    let snap = api.fetch_status().unwrap();
    mock.assert();
    assert_eq!(snap.state.current_index, -1);
}

#[test]
fn upload_posts_multipart_file_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.mp3");
    std::fs::write(&path, b"ID3 not really audio").unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/upload")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::Regex(
            r#"name="file"; filename="song\.mp3""#.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"success": true, "filename": "song_1.mp3"}"#)
        .create();

    let mut api = api_for(server.url());
    let reply = api.upload(&path).unwrap();
    mock.assert();
    assert!(reply.success);
    assert_eq!(reply.filename.as_deref(), Some("song_1.mp3"));
}

#[test]
fn upload_of_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut api = api_for("http://127.0.0.1:9".to_string());
    let err = api.upload(&dir.path().join("missing.mp3")).unwrap_err();
    assert!(matches!(err, crate::error::RemoteError::Io(_)));
}

#[test]
fn wire_snapshot_defaults_missing_fields() {
    let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
        "is_playing": true,
        "playlist_length": 4
    }))
    .unwrap();
    assert!(snapshot.files.is_none());
    assert_eq!(snapshot.playlist_length, Some(4));
    assert_eq!(snapshot.state.current_index, -1);
    assert_eq!(snapshot.state.volume, 0.7);
    assert!(snapshot.state.is_playing);
}

#[test]
fn control_reply_without_success_is_a_failure() {
    let reply: ControlReply =
        serde_json::from_value(serde_json::json!({"error": "Invalid song index"})).unwrap();
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Invalid song index"));
    assert_eq!(reply.current_index, None);
}
