//! Wire types exchanged with the player service.
//!
//! The server speaks loose JSON: most fields are optional depending on the
//! endpoint, so everything here leans on `#[serde(default)]`.

use serde::{Deserialize, Serialize};

/// A single uploaded song as reported by the server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// Human-readable duration, e.g. `3:07`.
    #[serde(rename = "duration_str", default)]
    pub duration: String,
    #[serde(rename = "duration", default)]
    pub duration_secs: u64,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
}

impl Track {
    /// Title to show for this track; falls back to the filename.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.filename
        } else {
            &self.title
        }
    }
}

/// Player state owned by the server. The client only ever holds a copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    /// Index into the playlist, `-1` when nothing is selected.
    pub current_index: i64,
    pub volume: f64,
    pub shuffle: bool,
    pub repeat: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            current_index: -1,
            volume: 0.7,
            shuffle: false,
            repeat: false,
        }
    }
}

/// A full server-reported state, replacing cached client state wholesale.
///
/// `/api/files` carries the playlist in `files`; `/api/status` only reports
/// `playlist_length`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireSnapshot")]
pub struct Snapshot {
    pub files: Option<Vec<Track>>,
    pub state: PlayerState,
    pub playlist_length: Option<usize>,
}

#[derive(Deserialize)]
struct WireSnapshot {
    #[serde(default)]
    files: Option<Vec<Track>>,
    #[serde(default)]
    current_song: Option<Track>,
    #[serde(default)]
    is_playing: bool,
    #[serde(default = "no_index")]
    current_index: i64,
    #[serde(default = "default_volume")]
    volume: f64,
    #[serde(default)]
    shuffle: bool,
    #[serde(default)]
    repeat: bool,
    #[serde(default)]
    playlist_length: Option<usize>,
}

fn no_index() -> i64 {
    -1
}

fn default_volume() -> f64 {
    PlayerState::default().volume
}

impl From<WireSnapshot> for Snapshot {
    fn from(w: WireSnapshot) -> Self {
        Self {
            files: w.files,
            state: PlayerState {
                current_track: w.current_song,
                is_playing: w.is_playing,
                current_index: w.current_index,
                volume: w.volume,
                shuffle: w.shuffle,
                repeat: w.repeat,
            },
            playlist_length: w.playlist_length,
        }
    }
}

/// Reply to a single control command. Only the fields the server sent back
/// are applied to local state.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ControlReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub current_song: Option<Track>,
    #[serde(default)]
    pub is_playing: Option<bool>,
    #[serde(default)]
    pub current_index: Option<i64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub shuffle: Option<bool>,
    #[serde(default)]
    pub repeat: Option<bool>,
}

/// Reply to `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Name the server stored the file under (it may add a `_N` suffix).
    #[serde(default)]
    pub filename: Option<String>,
}

/// One state-changing request.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Play(usize),
    Pause,
    Stop,
    Next,
    Previous,
    Volume(f64),
    ToggleShuffle,
    ToggleRepeat,
    Delete(String),
}

impl ControlCommand {
    /// Path segments under the base URL, e.g. `["api", "play", "3"]`.
    pub fn path_segments(&self) -> Vec<String> {
        let mut segments = vec!["api".to_string()];
        match self {
            ControlCommand::Play(i) => {
                segments.push("play".into());
                segments.push(i.to_string());
            }
            ControlCommand::Pause => segments.push("pause".into()),
            ControlCommand::Stop => segments.push("stop".into()),
            ControlCommand::Next => segments.push("next".into()),
            ControlCommand::Previous => segments.push("previous".into()),
            ControlCommand::Volume(v) => {
                segments.push("volume".into());
                segments.push(format_volume(*v));
            }
            ControlCommand::ToggleShuffle => segments.push("toggle_shuffle".into()),
            ControlCommand::ToggleRepeat => segments.push("toggle_repeat".into()),
            ControlCommand::Delete(name) => {
                segments.push("delete".into());
                segments.push(name.clone());
            }
        }
        segments
    }

    /// Short verb used in logs and fallback error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ControlCommand::Play(_) => "play",
            ControlCommand::Pause => "pause",
            ControlCommand::Stop => "stop",
            ControlCommand::Next => "next",
            ControlCommand::Previous => "previous",
            ControlCommand::Volume(_) => "volume",
            ControlCommand::ToggleShuffle => "shuffle",
            ControlCommand::ToggleRepeat => "repeat",
            ControlCommand::Delete(_) => "delete",
        }
    }
}

/// Render a volume so the server's float route accepts it: always with a
/// decimal point (`1.0`, not `1`).
pub fn format_volume(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
