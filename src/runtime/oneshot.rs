//! Non-interactive commands: one request (or one upload batch), printed
//! results, non-zero exit on failure.

use std::io::Write;

use crate::api::PlayerApi;
use crate::cli::Commands;
use crate::config::UiSettings;
use crate::controller::{Controller, Intent};
use crate::session::{NoticeLevel, Session};
use crate::ui::{format_file_size, now_playing_text, track_row};

/// Map a command to the intent it triggers. `None` for commands that only read.
fn intent_for(command: &Commands) -> Option<Intent> {
    let intent = match command {
        Commands::Play { index } => Intent::PlayIndex(*index),
        Commands::Pause => Intent::PlayPause,
        Commands::Stop => Intent::Stop,
        Commands::Next => Intent::Next,
        Commands::Previous => Intent::Previous,
        Commands::Volume { value } => Intent::SetVolume(*value),
        Commands::Shuffle => Intent::ToggleShuffle,
        Commands::Repeat => Intent::ToggleRepeat,
        Commands::Delete { filename } => Intent::Delete(filename.clone()),
        Commands::Upload { paths } => Intent::Upload(paths.clone()),
        Commands::Status | Commands::List | Commands::Config => return None,
    };
    Some(intent)
}

/// Most recent error or warning, used as the failure message.
fn failure_message(session: &Session) -> String {
    session
        .notices
        .iter()
        .rev()
        .find(|n| matches!(n.level, NoticeLevel::Error | NoticeLevel::Warning))
        .map(|n| n.message.clone())
        .unwrap_or_else(|| "request failed".to_string())
}

pub fn run<A: PlayerApi>(
    command: Commands,
    controller: &mut Controller<A>,
    ui: &UiSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout().lock();
    execute(command, controller, ui, &mut out)
}

pub(crate) fn execute<A, W>(
    command: Commands,
    controller: &mut Controller<A>,
    ui: &UiSettings,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    A: PlayerApi,
    W: Write,
{
    let intent = intent_for(&command);
    if let Some(Intent::Upload(paths)) = &intent {
        return upload(controller, paths, out);
    }

    // Everything else needs the playlist, if only to know whether anything
    // can play.
    if !controller.refresh_playlist() {
        return Err(failure_message(controller.session()).into());
    }

    let Some(intent) = intent else {
        return match command {
            Commands::List => print_list(controller.session(), out),
            _ => print_status(controller.session(), ui, out),
        };
    };

    if intent.needs_tracks() && !controller.session().has_tracks() {
        return Err("the playlist is empty".into());
    }

    let notices_before = controller.session().notices.len();
    if !controller.dispatch(intent) {
        return Err(failure_message(controller.session()).into());
    }

    let session = controller.session();
    for notice in session.notices.iter().skip(notices_before) {
        writeln!(out, "{}", notice.message)?;
    }
    if notices_before == session.notices.len() {
        print_status(session, ui, out)?;
    }
    Ok(())
}

fn upload<A, W>(
    controller: &mut Controller<A>,
    paths: &[std::path::PathBuf],
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    A: PlayerApi,
    W: Write,
{
    let Some(report) = controller.upload_paths(paths, |_| {}) else {
        return Err(failure_message(controller.session()).into());
    };

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(stored) => writeln!(out, "ok    {} -> {stored}", outcome.path.display())?,
            Err(e) => writeln!(out, "fail  {}: {e}", outcome.path.display())?,
        }
    }
    writeln!(out, "{}", report.summary())?;

    if report.uploaded == report.total {
        Ok(())
    } else {
        Err(format!("{} file(s) failed", report.total - report.uploaded).into())
    }
}

fn print_status<W: Write>(
    session: &Session,
    ui: &UiSettings,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    let player = &session.player;
    match &player.current_track {
        Some(track) => {
            let state = if player.is_playing { "Playing" } else { "Paused" };
            let position = match session.current_index() {
                Some(i) => format!(" ({}/{})", i + 1, session.tracks.len()),
                None => String::new(),
            };
            writeln!(
                out,
                "{state}: {}{position}",
                now_playing_text(track, ui)
            )?;
        }
        None => writeln!(out, "Stopped")?,
    }
    writeln!(out, "Volume: {}%", (player.volume * 100.0).round() as i64)?;
    writeln!(out, "Shuffle: {}", if player.shuffle { "on" } else { "off" })?;
    writeln!(out, "Repeat: {}", if player.repeat { "on" } else { "off" })?;
    writeln!(out, "Songs: {}", session.tracks.len())?;
    Ok(())
}

fn print_list<W: Write>(session: &Session, out: &mut W) -> Result<(), Box<dyn std::error::Error>> {
    if session.tracks.is_empty() {
        writeln!(out, "No songs uploaded yet")?;
        return Ok(());
    }

    let current = session.current_index();
    for (i, track) in session.tracks.iter().enumerate() {
        let marker = if current == Some(i) { '♪' } else { ' ' };
        writeln!(out, "{i:>3} {marker} {}  [{}]", track_row(track), track.filename)?;
    }
    let total: u64 = session.tracks.iter().map(|t| t.size).sum();
    writeln!(out, "{} song(s), {}", session.tracks.len(), format_file_size(total))?;
    Ok(())
}
