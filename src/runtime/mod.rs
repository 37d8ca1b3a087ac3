use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::HttpPlayerApi;
use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::controller::Controller;
use crate::logging::{self, LogTarget};
use crate::session::Session;

mod event_loop;
mod oneshot;
mod settings;

/// Build a controller talking to the configured server.
fn connect(settings: &Settings) -> Result<Controller<HttpPlayerApi>, Box<dyn std::error::Error>> {
    let api = HttpPlayerApi::new(&settings.server)?;
    let server = api.base_url().to_string();

    let mut session = Session::new(server);
    session.set_notice_ttl(Duration::from_millis(settings.ui.notice_ms));
    if !settings.ui.follow_playback {
        session.follow_playback_off();
    }

    Ok(Controller::new(api, session)
        .with_upload_settings(settings.upload.clone())
        .with_volume_step(settings.controls.volume_step))
}

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings(cli.config, cli.server);

    match cli.command {
        Some(Commands::Config) => {
            print!("{}", toml::to_string(&settings)?);
            Ok(())
        }
        Some(command) => {
            logging::init(&settings.log, LogTarget::Stderr);
            let mut controller = connect(&settings)?;
            oneshot::run(command, &mut controller, &settings.ui)
        }
        None => {
            logging::init(&settings.log, LogTarget::File);
            let controller = connect(&settings)?;
            run_tui(controller, &settings)
        }
    }
}

fn run_tui(
    mut controller: Controller<HttpPlayerApi>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(server = %controller.session().server, "starting terminal UI");
    controller.refresh_playlist();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(&mut terminal, settings, &mut controller, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
