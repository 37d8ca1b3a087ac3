//! UI rendering helpers for the terminal user interface.
//!
//! Everything here is a pure function of the `Session`; the runtime decides
//! when to redraw.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::api::Track;
use crate::config::{TrackField, UiSettings};
use crate::session::{NoticeLevel, Prompt, Session};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected song");
    map.insert("space/p", "play/pause");
    map.insert("x", "stop");
    map.insert("h/l", "prev/next song");
    map.insert("+/-", "volume");
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("u", "upload");
    map.insert("d", "delete");
    map.insert("R", "refresh");
    map.insert("K", "details");
    map.insert("q", "quit");
    map
});

/// Render the controls help text.
fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "enter", "space/p", "x", "+/-", "gg/G", "s", "r", "u", "d", "R", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}")))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Human-readable byte count using 1024-based units, e.g. `3.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // One decimal, halves rounded up, trailing ".0" dropped.
    let rounded = (value * 10.0).round() / 10.0;
    format!("{rounded} {}", UNITS[unit])
}

/// Build the "now playing" text according to `ui` settings.
pub fn now_playing_text(track: &Track, ui: &UiSettings) -> String {
    let parts: Vec<String> = ui
        .now_playing_fields
        .iter()
        .filter_map(|f| field_text(track, *f))
        .collect();

    if parts.is_empty() {
        track.display_title().to_string()
    } else {
        parts.join(&ui.now_playing_separator)
    }
}

fn field_text(track: &Track, field: TrackField) -> Option<String> {
    let text = match field {
        TrackField::Title => track.title.trim().to_string(),
        TrackField::Artist => track.artist.trim().to_string(),
        TrackField::Filename => track.filename.clone(),
        TrackField::Duration => track.duration.trim().to_string(),
        TrackField::Size => format_file_size(track.size),
    };
    (!text.is_empty()).then_some(text)
}

/// One playlist row: `title • artist • duration • size`.
pub fn track_row(track: &Track) -> String {
    let mut parts = vec![track.display_title().to_string()];
    if !track.artist.trim().is_empty() {
        parts.push(track.artist.trim().to_string());
    }
    if !track.duration.trim().is_empty() {
        parts.push(track.duration.trim().to_string());
    }
    parts.push(format_file_size(track.size));
    parts.join(" • ")
}

fn status_lines(session: &Session, ui: &UiSettings) -> Vec<Line<'static>> {
    let player = &session.player;

    let song = match &player.current_track {
        Some(track) => {
            let song = now_playing_text(track, ui);
            let state = if player.is_playing { "Playing" } else { "Paused" };
            if track.duration.trim().is_empty() {
                format!("Song: {song} • {state}")
            } else {
                format!("Song: {song} [{}] • {state}", track.duration.trim())
            }
        }
        None => "No song selected".to_string(),
    };

    let cursor = if session.follow_playback { "Follow" } else { "Free-roam" };
    let modes = format!(
        "Volume: {}% • Shuffle: {} • Repeat: {} • CURSOR: {cursor}",
        (player.volume * 100.0).round() as i64,
        if player.shuffle { "ON" } else { "OFF" },
        if player.repeat { "ON" } else { "OFF" },
    );

    vec![
        Line::from(song),
        Line::from(modes),
        Line::from(format!("Server: {}", session.server)),
    ]
}

fn notice_style(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Info => Style::default().fg(Color::Cyan),
        NoticeLevel::Success => Style::default().fg(Color::Green),
        NoticeLevel::Warning => Style::default().fg(Color::Yellow),
        NoticeLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn prompt_line(prompt: &Prompt) -> Line<'_> {
    match prompt {
        Prompt::UploadPath(input) => Line::from(vec![
            Span::raw("Upload path: ").bold(),
            Span::raw(input.as_str()),
            Span::raw("_").slow_blink(),
            Span::raw("  (enter sends, esc cancels)").dim(),
        ]),
        Prompt::ConfirmDelete(name) => Line::from(vec![
            Span::raw(format!("Delete {name}? ")).bold(),
            Span::raw("[y/n]"),
        ]),
    }
}

/// Lines shown in the message box: the active prompt, then notices oldest first.
fn message_lines(session: &Session) -> Vec<Line<'_>> {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(prompt) = &session.prompt {
        lines.push(prompt_line(prompt));
    }
    for notice in &session.notices {
        lines.push(Line::from(Span::styled(
            notice.message.as_str(),
            notice_style(notice.level),
        )));
    }
    lines
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Window of `list_height` rows around `selected`: `(start, end, selected_in_window)`.
fn visible_window(total: usize, selected: usize, list_height: usize) -> (usize, usize, usize) {
    if total <= list_height || list_height == 0 {
        return (0, total, selected);
    }
    let half = list_height / 2;
    let mut start = selected.saturating_sub(half);
    if start + list_height > total {
        start = total - list_height;
    }
    (start, start + list_height, selected - start)
}

fn left_padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame` from `session` and settings.
pub fn draw(frame: &mut Frame, session: &Session, ui_settings: &UiSettings) {
    let messages = message_lines(session);
    let message_height = messages.len().max(1) as u16 + 2;
    let gauge_height = if session.upload.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(gauge_height),
            Constraint::Length(message_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" pi-remote ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // One field group per line so a long title never pushes the rest out.
    let status = Paragraph::new(status_lines(session, ui_settings))
        .block(left_padded(" status "));
    frame.render_widget(status, chunks[1]);

    // Main list
    if session.tracks.is_empty() {
        let empty = Paragraph::new("No songs uploaded yet. Press u to upload.")
            .alignment(Alignment::Center)
            .dim()
            .block(Block::default().borders(Borders::ALL).title(" playlist "));
        frame.render_widget(empty, chunks[2]);
    } else {
        // Only build ListItems for the visible window.
        let total = session.tracks.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let (start, end, selected_in_window) =
            visible_window(total, session.selected, list_height);
        let current = session.current_index();

        let items: Vec<ListItem> = session.tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let row = track_row(track);
                if current == Some(start + offset) {
                    ListItem::new(format!("♪ {row}"))
                        .style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    ListItem::new(format!("  {row}"))
                }
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" playlist ({total}) ")),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(selected_in_window));
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Overlay details popup (keeps list visible under it)
    if session.details_window {
        let list_area = chunks[2];
        let popup_area = centered_rect_sized(72, 9, list_area);
        frame.render_widget(Clear, popup_area);

        let details = match session.selected_track() {
            Some(track) => format!(
                "Title: {}\nArtist: {}\nDuration: {} ({}s)\nSize: {}\nFile: {}",
                track.display_title(),
                if track.artist.trim().is_empty() { "-" } else { track.artist.as_str() },
                if track.duration.trim().is_empty() { "-" } else { track.duration.as_str() },
                track.duration_secs,
                format_file_size(track.size),
                track.filename,
            ),
            None => "No track selected".to_string(),
        };
        let popup = Paragraph::new(details)
            .block(left_padded(" details (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(popup, popup_area);
    }

    if let Some(progress) = &session.upload {
        let label = match &progress.current {
            Some(name) => format!("{} • sending {name}", progress.summary()),
            None => progress.summary(),
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" upload "))
            .gauge_style(Style::default().fg(Color::Green))
            .percent(progress.percent())
            .label(label);
        frame.render_widget(gauge, chunks[3]);
    }

    let message_box = Paragraph::new(messages)
        .block(left_padded(" messages "))
        .wrap(Wrap { trim: true });
    frame.render_widget(message_box, chunks[4]);

    let footer = Paragraph::new(controls_text())
        .block(left_padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}
