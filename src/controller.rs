//! The client state controller.
//!
//! Every user action and every poll tick goes through `Controller`: it sends
//! the request, reconciles the reply into the `Session`, and turns failures
//! into notices. Nothing here is fatal and nothing is retried.

use std::path::{Path, PathBuf};

use crate::api::{ControlCommand, PlayerApi};
use crate::config::UploadSettings;
use crate::error::RemoteError;
use crate::session::{NoticeLevel, Session, UploadProgress};
use crate::upload::collect_candidates;

mod intent;

pub use intent::Intent;

/// Result of uploading one file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub path: PathBuf,
    /// Name the server stored the file under, or the failure message.
    pub result: Result<String, String>,
}

/// Result of a whole upload batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
    pub uploaded: usize,
    pub total: usize,
}

impl UploadReport {
    pub fn summary(&self) -> String {
        format!("{}/{} uploaded", self.uploaded, self.total)
    }
}

pub struct Controller<A: PlayerApi> {
    api: A,
    session: Session,
    upload_settings: UploadSettings,
    volume_step: f64,
}

impl<A: PlayerApi> Controller<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            upload_settings: UploadSettings::default(),
            volume_step: 0.05,
        }
    }

    pub fn with_upload_settings(mut self, settings: UploadSettings) -> Self {
        self.upload_settings = settings;
        self
    }

    pub fn with_volume_step(mut self, step: f64) -> Self {
        self.volume_step = step;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch the playlist and player state and replace the cached copy.
    /// Returns true when a snapshot was applied.
    pub fn refresh_playlist(&mut self) -> bool {
        match self.load_playlist() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "playlist refresh failed");
                self.session
                    .notify(NoticeLevel::Error, format!("Could not load the playlist: {e}"));
                false
            }
        }
    }

    fn load_playlist(&mut self) -> Result<(), RemoteError> {
        let snapshot = self.api.fetch_files()?;
        let count = snapshot.files.as_ref().map(Vec::len).unwrap_or(0);
        self.session.apply_snapshot(snapshot);
        tracing::debug!(tracks = count, "playlist refreshed");
        Ok(())
    }

    /// Send one control command and apply the reply. On failure the cached
    /// state is left as it was and an error notice is raised.
    pub fn set_control(&mut self, command: ControlCommand) -> bool {
        let outcome = self.api.send_control(&command).and_then(|reply| {
            if reply.success {
                Ok(reply)
            } else {
                Err(RemoteError::server(reply.error.as_deref(), failure_text(&command)))
            }
        });

        match outcome {
            Ok(reply) => {
                tracing::info!(command = command.label(), "control applied");
                self.session.apply_reply(&reply);
                self.announce(&command);
                true
            }
            Err(e) => {
                tracing::warn!(command = command.label(), error = %e, "control failed");
                let message = if e.is_logical() {
                    e.to_string()
                } else {
                    format!("{}: {e}", failure_text(&command))
                };
                self.session.notify(NoticeLevel::Error, message);
                false
            }
        }
    }

    fn announce(&mut self, command: &ControlCommand) {
        match command {
            ControlCommand::Play(_) => {
                if let Some(track) = &self.session.player.current_track {
                    let message = format!("Playing: {}", track.display_title());
                    self.session.notify(NoticeLevel::Success, message);
                }
            }
            ControlCommand::ToggleShuffle => {
                let message = format!("Shuffle {}", on_off(self.session.player.shuffle));
                self.session.notify(NoticeLevel::Info, message);
            }
            ControlCommand::ToggleRepeat => {
                let message = format!("Repeat {}", on_off(self.session.player.repeat));
                self.session.notify(NoticeLevel::Info, message);
            }
            ControlCommand::Delete(_) => {
                self.session.notify(NoticeLevel::Success, "File deleted");
                self.refresh_playlist();
            }
            _ => {}
        }
    }

    /// Upload `files` one at a time, in order. A failed file does not stop
    /// the batch. `on_progress` sees the session after every step. The
    /// playlist is refreshed once the batch is done.
    pub fn upload_tracks<F>(&mut self, files: &[PathBuf], mut on_progress: F) -> UploadReport
    where
        F: FnMut(&Session),
    {
        let total = files.len();
        if total == 0 {
            return UploadReport::default();
        }

        let mut report = UploadReport {
            outcomes: Vec::with_capacity(total),
            uploaded: 0,
            total,
        };
        self.session.upload = Some(UploadProgress::new(total));
        self.session.mark_dirty();

        for path in files {
            let name = file_label(path);
            if let Some(progress) = self.session.upload.as_mut() {
                progress.current = Some(name.clone());
            }
            self.session.mark_dirty();
            on_progress(&self.session);

            let result = self.upload_one(path);
            match &result {
                Ok(stored) => {
                    tracing::info!(file = %name, stored = %stored, "uploaded");
                    report.uploaded += 1;
                }
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "upload failed");
                    self.session.notify(
                        NoticeLevel::Error,
                        format!("{name} could not be uploaded: {e}"),
                    );
                }
            }

            if let Some(progress) = self.session.upload.as_mut() {
                progress.done += 1;
                progress.uploaded = report.uploaded;
                progress.current = None;
            }
            report.outcomes.push(UploadOutcome {
                path: path.clone(),
                result: result.map_err(|e| e.to_string()),
            });
            self.session.mark_dirty();
            on_progress(&self.session);
        }

        self.session.upload = None;
        let level = if report.uploaded == total {
            NoticeLevel::Success
        } else if report.uploaded == 0 {
            NoticeLevel::Error
        } else {
            NoticeLevel::Warning
        };
        self.session.notify(level, report.summary());
        self.refresh_playlist();
        report
    }

    fn upload_one(&mut self, path: &Path) -> Result<String, RemoteError> {
        let reply = self.api.upload(path)?;
        if reply.success {
            Ok(reply.filename.unwrap_or_else(|| file_label(path)))
        } else {
            Err(RemoteError::server(reply.error.as_deref(), "upload rejected"))
        }
    }

    /// Expand `paths`, run the advisory extension filter, and upload what
    /// is left. Returns `None` when nothing was worth sending.
    pub fn upload_paths<F>(&mut self, paths: &[PathBuf], on_progress: F) -> Option<UploadReport>
    where
        F: FnMut(&Session),
    {
        let candidates = collect_candidates(paths, &self.upload_settings);

        if candidates.accepted.is_empty() {
            let message = match candidates.skipped.first() {
                Some(p) => {
                    tracing::warn!(
                        error = %RemoteError::Unsupported(p.clone()),
                        skipped = candidates.skipped.len(),
                        "no upload candidates"
                    );
                    self.only_allowed_text()
                }
                None => {
                    tracing::warn!("no files found to upload");
                    "No files found to upload".to_string()
                }
            };
            self.session.notify(NoticeLevel::Warning, message);
            return None;
        }

        if !candidates.skipped.is_empty() {
            for p in &candidates.skipped {
                tracing::debug!(error = %RemoteError::Unsupported(p.clone()), "skipped");
            }
            self.session.notify(
                NoticeLevel::Warning,
                format!(
                    "Skipped {} file(s). {}",
                    candidates.skipped.len(),
                    self.only_allowed_text()
                ),
            );
        }

        Some(self.upload_tracks(&candidates.accepted, on_progress))
    }

    fn only_allowed_text(&self) -> String {
        let exts: Vec<String> = self
            .upload_settings
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_uppercase())
            .collect();
        format!("Only {} files can be uploaded", exts.join("/"))
    }

    /// One poll tick: fetch the status and, if playback changed out of band,
    /// replace the cached state. Returns true when a re-render is needed.
    pub fn poll_status(&mut self) -> bool {
        let snapshot = match self.api.fetch_status() {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "status poll failed");
                return false;
            }
        };

        if let Some(len) = snapshot.playlist_length {
            if len != self.session.tracks.len() {
                tracing::info!(
                    server = len,
                    cached = self.session.tracks.len(),
                    "playlist length changed, refreshing"
                );
                // Poll ticks stay silent; the next tick retries.
                return match self.load_playlist() {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::debug!(error = %e, "playlist refresh after poll failed");
                        false
                    }
                };
            }
        }

        if self.session.differs_materially(&snapshot.state) {
            tracing::debug!(
                playing = snapshot.state.is_playing,
                index = snapshot.state.current_index,
                "playback changed on the server"
            );
            self.session.replace_player_state(snapshot.state);
            true
        } else {
            false
        }
    }

    /// Run one user intent. Returns true when a request was issued.
    pub fn dispatch(&mut self, intent: Intent) -> bool {
        self.dispatch_with(intent, |_| {})
    }

    /// Like [`Controller::dispatch`], reporting upload progress to `on_progress`.
    pub fn dispatch_with<F>(&mut self, intent: Intent, on_progress: F) -> bool
    where
        F: FnMut(&Session),
    {
        if intent.needs_tracks() && !self.session.has_tracks() {
            tracing::debug!(?intent, "ignored: playlist is empty");
            return false;
        }

        match intent {
            Intent::PlayIndex(i) => self.set_control(ControlCommand::Play(i)),
            Intent::PlayPause => {
                if self.session.player.current_track.is_none() {
                    self.set_control(ControlCommand::Play(0))
                } else {
                    self.set_control(ControlCommand::Pause)
                }
            }
            Intent::Stop => self.set_control(ControlCommand::Stop),
            Intent::Next => self.set_control(ControlCommand::Next),
            Intent::Previous => self.set_control(ControlCommand::Previous),
            Intent::SetVolume(v) => self.set_control(ControlCommand::Volume(v)),
            Intent::VolumeUp => {
                let v = step_volume(self.session.player.volume, self.volume_step);
                self.set_control(ControlCommand::Volume(v))
            }
            Intent::VolumeDown => {
                let v = step_volume(self.session.player.volume, -self.volume_step);
                // The server route has no sign, so the key stops at zero.
                let v = if v < 0.0 { 0.0 } else { v };
                self.set_control(ControlCommand::Volume(v))
            }
            Intent::ToggleShuffle => self.set_control(ControlCommand::ToggleShuffle),
            Intent::ToggleRepeat => self.set_control(ControlCommand::ToggleRepeat),
            Intent::Delete(name) => self.set_control(ControlCommand::Delete(name)),
            Intent::Refresh => {
                self.refresh_playlist();
                true
            }
            Intent::Upload(paths) => self.upload_paths(&paths, on_progress).is_some(),
        }
    }
}

/// Message shown when a command fails without a server-provided reason.
fn failure_text(command: &ControlCommand) -> &'static str {
    match command {
        ControlCommand::Play(_) => "Could not play the song",
        ControlCommand::Pause | ControlCommand::Stop => "Operation failed",
        ControlCommand::Next => "Could not skip to the next song",
        ControlCommand::Previous => "Could not go back to the previous song",
        ControlCommand::Volume(_) => "Could not set the volume",
        ControlCommand::ToggleShuffle => "Could not change shuffle mode",
        ControlCommand::ToggleRepeat => "Could not change repeat mode",
        ControlCommand::Delete(_) => "Could not delete the file",
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Step from the cached volume, rounded to hundredths. The upper end is not
/// clamped; the server decides the final value.
fn step_volume(current: f64, step: f64) -> f64 {
    ((current + step) * 100.0).round() / 100.0
}
