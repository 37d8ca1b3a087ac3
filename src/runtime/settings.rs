use std::path::PathBuf;

use crate::config;

/// Load settings from `config_path` (or the default location), falling back
/// to defaults when the file is unreadable or invalid. A `server` override
/// from the command line wins over every other source.
pub fn load_settings(config_path: Option<PathBuf>, server: Option<String>) -> config::Settings {
    let loaded = match config_path {
        Some(path) => config::Settings::load_from(Some(path)),
        None => config::Settings::load(),
    };
    let mut settings = match loaded {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("pi-remote: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("pi-remote: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    };

    if let Some(url) = server {
        settings.server.url = url;
    }
    settings
}
