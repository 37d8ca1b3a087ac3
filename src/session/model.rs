//! Session state types: `Session`, notices, upload progress and prompts.
//!
//! `Session` holds the client's copy of the server state plus purely local
//! UI state (cursor, notices, prompts). Server data only ever enters through
//! the reconciliation methods (`apply_snapshot`, `apply_reply`,
//! `replace_player_state`).

use std::time::{Duration, Instant};

use crate::api::{ControlReply, PlayerState, Snapshot, Track};

/// Most notices kept on screen at once; older ones are dropped first.
const MAX_NOTICES: usize = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// Progress of a sequential upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadProgress {
    /// Files processed so far (successful or not).
    pub done: usize,
    pub total: usize,
    /// Files the server accepted.
    pub uploaded: usize,
    /// Name of the file currently being sent.
    pub current: Option<String>,
}

impl UploadProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Share of the batch processed, 0-100.
    pub fn percent(&self) -> u16 {
        if self.total == 0 {
            return 100;
        }
        ((self.done * 100) / self.total).min(100) as u16
    }

    /// Aggregate status, e.g. `2/3 uploaded`.
    pub fn summary(&self) -> String {
        format!("{}/{} uploaded", self.uploaded, self.total)
    }
}

/// Line-input states layered over the track list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Typing a file or directory path to upload.
    UploadPath(String),
    /// Waiting for `y` / `n` before deleting the named file.
    ConfirmDelete(String),
}

/// The remote's session state.
pub struct Session {
    pub tracks: Vec<Track>,
    pub player: PlayerState,
    pub selected: usize,
    pub follow_playback: bool,

    pub notices: Vec<Notice>,
    pub upload: Option<UploadProgress>,
    pub prompt: Option<Prompt>,
    pub details_window: bool,

    /// Server address, for display only.
    pub server: String,
    /// Set whenever something visible changed; the UI loop redraws and clears it.
    pub dirty: bool,

    notice_ttl: Duration,
}

impl Session {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            tracks: Vec::new(),
            player: PlayerState::default(),
            selected: 0,
            follow_playback: true,

            notices: Vec::new(),
            upload: None,
            prompt: None,
            details_window: false,

            server: server.into(),
            dirty: true,

            notice_ttl: Duration::from_millis(4000),
        }
    }

    /// Base lifetime for error/warning notices; success and info notices
    /// are shorter.
    pub fn set_notice_ttl(&mut self, ttl: Duration) {
        self.notice_ttl = ttl;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Return true if the playlist contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Currently playing index, if any.
    pub fn current_index(&self) -> Option<usize> {
        usize::try_from(self.player.current_index).ok()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Replace playlist and player state wholesale with a server snapshot.
    ///
    /// A snapshot without `files` (a status reply) keeps the cached playlist.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        if let Some(files) = snapshot.files {
            self.tracks = files;
        }
        self.replace_player_state(snapshot.state);
        self.clamp_selected();
    }

    /// Overwrite the cached player state, normalizing `current_index` to
    /// `-1` when it does not address a cached track.
    pub fn replace_player_state(&mut self, mut state: PlayerState) {
        state.current_index = normalize_index(state.current_index, self.tracks.len());
        self.player = state;
        self.follow_current();
        self.mark_dirty();
    }

    /// Apply the fields a control reply carried; absent fields keep their
    /// cached values.
    pub fn apply_reply(&mut self, reply: &ControlReply) {
        if let Some(song) = &reply.current_song {
            self.player.current_track = Some(song.clone());
        }
        if let Some(playing) = reply.is_playing {
            self.player.is_playing = playing;
        }
        if let Some(index) = reply.current_index {
            self.player.current_index = normalize_index(index, self.tracks.len());
        }
        if let Some(volume) = reply.volume {
            self.player.volume = volume;
        }
        if let Some(shuffle) = reply.shuffle {
            self.player.shuffle = shuffle;
        }
        if let Some(repeat) = reply.repeat {
            self.player.repeat = repeat;
        }
        self.follow_current();
        self.mark_dirty();
    }

    /// Whether `state` changed what the user sees as playback: play state or
    /// current index.
    pub fn differs_materially(&self, state: &PlayerState) -> bool {
        state.is_playing != self.player.is_playing
            || normalize_index(state.current_index, self.tracks.len()) != self.player.current_index
    }

    /// Push a notice with the default lifetime for its level.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let ttl = self.ttl_for(level);
        self.notify_for(level, message, ttl);
    }

    pub fn notify_for(&mut self, level: NoticeLevel, message: impl Into<String>, ttl: Duration) {
        self.notices.push(Notice {
            level,
            message: message.into(),
            expires_at: Instant::now() + ttl,
        });
        if self.notices.len() > MAX_NOTICES {
            let overflow = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..overflow);
        }
        self.mark_dirty();
    }

    fn ttl_for(&self, level: NoticeLevel) -> Duration {
        match level {
            NoticeLevel::Error | NoticeLevel::Warning => self.notice_ttl,
            NoticeLevel::Success => self.notice_ttl / 2,
            NoticeLevel::Info => self.notice_ttl * 3 / 8,
        }
    }

    /// Drop notices that expired at `now`. Returns true when any was removed.
    pub fn expire_notices(&mut self, now: Instant) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.expires_at > now);
        let changed = self.notices.len() != before;
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Enable following playback (cursor follows the current track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
        self.follow_current();
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    fn follow_current(&mut self) {
        if !self.follow_playback {
            return;
        }
        if let Some(idx) = self.current_index() {
            if idx < self.tracks.len() && self.selected != idx {
                self.selected = idx;
                self.mark_dirty();
            }
        }
    }

    fn clamp_selected(&mut self) {
        if self.tracks.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.tracks.len() {
            self.selected = self.tracks.len() - 1;
        }
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.tracks.len();
        self.mark_dirty();
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = match self.selected {
            0 => self.tracks.len() - 1,
            s => s - 1,
        };
        self.mark_dirty();
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.mark_dirty();
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
        self.mark_dirty();
    }

    pub fn toggle_details_window(&mut self) {
        self.details_window = !self.details_window;
        self.mark_dirty();
    }

    pub fn set_prompt(&mut self, prompt: Option<Prompt>) {
        self.prompt = prompt;
        self.mark_dirty();
    }
}

/// Clamp a server index into `[-1, len - 1]`.
pub fn normalize_index(index: i64, len: usize) -> i64 {
    match usize::try_from(index) {
        Ok(i) if i < len => index,
        _ => -1,
    }
}
