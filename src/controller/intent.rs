use std::path::PathBuf;

/// A user intent, mapped by `Controller::dispatch` to one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    PlayIndex(usize),
    /// Pause/resume; starts the first track when nothing is loaded yet.
    PlayPause,
    Stop,
    Next,
    Previous,
    /// Passed to the server as-is, out-of-range values included.
    SetVolume(f64),
    VolumeUp,
    VolumeDown,
    ToggleShuffle,
    ToggleRepeat,
    Delete(String),
    Refresh,
    Upload(Vec<PathBuf>),
}

impl Intent {
    /// Transport controls are disabled while the playlist is empty.
    pub fn needs_tracks(&self) -> bool {
        matches!(
            self,
            Intent::PlayIndex(_) | Intent::PlayPause | Intent::Stop | Intent::Next | Intent::Previous
        )
    }
}
