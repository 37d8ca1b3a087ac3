use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/pi-remote/config.toml` or `~/.config/pi-remote/config.toml`
///
/// Precedence (highest wins):
/// 1) Command-line flags (`--server`)
/// 2) Environment variables (prefix `PI_REMOTE__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub polling: PollingSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub upload: UploadSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the player service.
    pub url: String,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5001".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingSettings {
    /// How often to ask the server for its status (milliseconds).
    pub interval_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self { interval_ms: 2000 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Volume change applied by `+` / `-` (0.0 - 1.0 scale).
    pub volume_step: f64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { volume_step: 0.05 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the cursor starts in "follow playback" mode.
    pub follow_playback: bool,

    /// The text rendered inside the top header box.
    pub header_text: String,

    /// How long notices stay on screen (milliseconds).
    pub notice_ms: u64,

    /// Which track fields to show in the status "Song:" line, and in what order.
    ///
    /// Example: ["artist", "title"]
    pub now_playing_fields: Vec<TrackField>,

    /// Separator used to join `now_playing_fields`.
    pub now_playing_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            header_text: " ~ Pi MP3 Player ~ ".to_string(),
            notice_ms: 4000,
            now_playing_fields: vec![TrackField::Title, TrackField::Artist],
            now_playing_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackField {
    Title,
    Artist,
    #[serde(alias = "file", alias = "file-name")]
    Filename,
    Duration,
    Size,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadSettings {
    /// File extensions offered for upload (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Skip files whose extension is not listed. The server has the final word
    /// either way.
    pub filter_extensions: bool,
    /// Whether to recurse into subdirectories of a directory argument.
    pub recursive: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to follow symlinks while expanding directories.
    pub follow_links: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into()],
            filter_extensions: true,
            recursive: false,
            include_hidden: false,
            follow_links: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Log file used while the terminal UI is running. Without one, UI
    /// sessions are not logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
