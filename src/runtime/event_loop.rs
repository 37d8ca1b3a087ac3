use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::{HttpPlayerApi, PlayerApi};
use crate::config;
use crate::controller::{Controller, Intent};
use crate::session::{Prompt, Session};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// When the last status poll ran.
    pub last_poll: Instant,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            pending_gg: false,
            last_poll: Instant::now(),
        }
    }
}

/// Main terminal event loop: polls the server, expires notices, redraws when
/// the session changed and handles input. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    controller: &mut Controller<HttpPlayerApi>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let poll_interval = Duration::from_millis(settings.polling.interval_ms);

    loop {
        // Blocking request: the next tick cannot start before this one returns.
        if state.last_poll.elapsed() >= poll_interval {
            controller.poll_status();
            state.last_poll = Instant::now();
        }

        controller.session_mut().expire_notices(Instant::now());

        if controller.session().dirty {
            terminal.draw(|f| ui::draw(f, controller.session(), &settings.ui))?;
            controller.session_mut().clear_dirty();
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let mut redraw = |session: &Session| {
                        if let Err(e) = terminal.draw(|f| ui::draw(f, session, &settings.ui)) {
                            tracing::debug!(error = %e, "progress redraw failed");
                        }
                    };
                    if handle_key_event(key, controller, state, &mut redraw) {
                        break;
                    }
                }
                Event::Resize(_, _) => controller.session_mut().mark_dirty(),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Apply one key press. `redraw` is called while an upload is running so the
/// progress gauge stays live. Returns true when the user asked to quit.
pub(crate) fn handle_key_event<A, F>(
    key: KeyEvent,
    controller: &mut Controller<A>,
    state: &mut EventLoopState,
    redraw: &mut F,
) -> bool
where
    A: PlayerApi,
    F: FnMut(&Session),
{
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if let Some(prompt) = controller.session().prompt.clone() {
        state.pending_gg = false;
        handle_prompt_key(key, prompt, controller, redraw);
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                let session = controller.session_mut();
                session.follow_playback_off();
                session.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            let session = controller.session_mut();
            session.follow_playback_off();
            session.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let session = controller.session_mut();
            session.follow_playback_off();
            session.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let session = controller.session_mut();
            session.follow_playback_off();
            session.prev();
        }
        KeyCode::Enter => {
            let selected = controller.session().selected;
            if controller.dispatch(Intent::PlayIndex(selected)) {
                controller.session_mut().follow_playback_on();
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            controller.dispatch(Intent::PlayPause);
        }
        KeyCode::Char('x') => {
            controller.dispatch(Intent::Stop);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            controller.dispatch(Intent::Previous);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            controller.dispatch(Intent::Next);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            controller.dispatch(Intent::VolumeUp);
        }
        KeyCode::Char('-') => {
            controller.dispatch(Intent::VolumeDown);
        }
        KeyCode::Char('s') => {
            controller.dispatch(Intent::ToggleShuffle);
        }
        KeyCode::Char('r') => {
            controller.dispatch(Intent::ToggleRepeat);
        }
        KeyCode::Char('R') => {
            controller.dispatch(Intent::Refresh);
        }
        KeyCode::Char('u') => {
            controller
                .session_mut()
                .set_prompt(Some(Prompt::UploadPath(String::new())));
        }
        KeyCode::Char('d') => {
            let filename = controller.session().selected_track().map(|t| t.filename.clone());
            if let Some(filename) = filename {
                controller
                    .session_mut()
                    .set_prompt(Some(Prompt::ConfirmDelete(filename)));
            }
        }
        KeyCode::Char('K') => controller.session_mut().toggle_details_window(),
        KeyCode::Esc => {
            if controller.session().details_window {
                controller.session_mut().toggle_details_window();
            }
        }
        _ => {}
    }

    false
}

fn handle_prompt_key<A, F>(key: KeyEvent, prompt: Prompt, controller: &mut Controller<A>, redraw: &mut F)
where
    A: PlayerApi,
    F: FnMut(&Session),
{
    match prompt {
        Prompt::UploadPath(mut input) => match key.code {
            KeyCode::Esc => controller.session_mut().set_prompt(None),
            KeyCode::Enter => {
                controller.session_mut().set_prompt(None);
                let input = input.trim();
                if !input.is_empty() {
                    let home = std::env::var_os("HOME").map(PathBuf::from);
                    let path = expand_home(input, home);
                    controller.dispatch_with(Intent::Upload(vec![path]), &mut *redraw);
                }
            }
            KeyCode::Backspace => {
                input.pop();
                controller.session_mut().set_prompt(Some(Prompt::UploadPath(input)));
            }
            KeyCode::Char(c) if !c.is_control() => {
                input.push(c);
                controller.session_mut().set_prompt(Some(Prompt::UploadPath(input)));
            }
            _ => {}
        },
        Prompt::ConfirmDelete(filename) => {
            controller.session_mut().set_prompt(None);
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                controller.dispatch(Intent::Delete(filename));
            }
        }
    }
}

/// Expand a leading `~` to `home`.
fn expand_home(input: &str, home: Option<PathBuf>) -> PathBuf {
    match (input.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(input),
    }
}
