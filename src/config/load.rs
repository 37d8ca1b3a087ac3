use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `PI_REMOTE__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        Self::load_from(resolve_config_path())
    }

    /// Same as [`Settings::load`] but with an explicit config file path.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("PI_REMOTE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.polling.interval_ms == 0 {
            return Err("polling.interval_ms must be >= 1".to_string());
        }
        if self.server.timeout_secs == 0 {
            return Err("server.timeout_secs must be >= 1".to_string());
        }
        let step = self.controls.volume_step;
        if step.is_nan() || step <= 0.0 {
            return Err("controls.volume_step must be > 0".to_string());
        }
        crate::api::parse_base_url(&self.server.url).map_err(|e| format!("server.url: {e}"))?;
        Ok(())
    }
}

/// Resolve the config path from `PI_REMOTE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("PI_REMOTE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/pi-remote/config.toml`
/// or `~/.config/pi-remote/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("pi-remote").join("config.toml"))
}
