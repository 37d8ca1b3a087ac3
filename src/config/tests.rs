use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_pi_remote_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("PI_REMOTE_CONFIG_PATH", "/tmp/pi-remote-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/pi-remote-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("pi-remote")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("pi-remote")
            .join("config.toml")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.polling.interval_ms, 2000);
    assert_eq!(s.upload.extensions, vec!["mp3".to_string()]);
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[server]
url = "http://raspberrypi.local:5001"
timeout_secs = 5

[polling]
interval_ms = 750

[controls]
volume_step = 0.1

[ui]
follow_playback = false
header_text = "hello"
notice_ms = 1500
now_playing_fields = ["artist", "file", "duration"]
now_playing_separator = " | "

[upload]
extensions = ["mp3", "MP3"]
filter_extensions = false
recursive = true

[log]
level = "debug"
file = "/tmp/pi-remote.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PI_REMOTE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("PI_REMOTE__POLLING__INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.server.url, "http://raspberrypi.local:5001");
    assert_eq!(s.server.timeout_secs, 5);
    assert_eq!(s.polling.interval_ms, 750);
    assert_eq!(s.controls.volume_step, 0.1);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.notice_ms, 1500);
    assert_eq!(
        s.ui.now_playing_fields,
        vec![TrackField::Artist, TrackField::Filename, TrackField::Duration]
    );
    assert_eq!(s.ui.now_playing_separator, " | ");
    assert_eq!(s.upload.extensions.len(), 2);
    assert!(!s.upload.filter_extensions);
    assert!(s.upload.recursive);
    assert!(!s.upload.include_hidden);
    assert_eq!(s.log.level, "debug");
    assert_eq!(
        s.log.file,
        Some(std::path::PathBuf::from("/tmp/pi-remote.log"))
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[polling]
interval_ms = 2000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PI_REMOTE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("PI_REMOTE__POLLING__INTERVAL_MS", "500");

    let s = Settings::load().unwrap();
    assert_eq!(s.polling.interval_ms, 500);
}

#[test]
fn validate_rejects_bad_values() {
    let mut s = Settings::default();
    s.polling.interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.volume_step = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.server.url = "raspberrypi:5001/player".to_string();
    assert!(s.validate().is_err());
}

#[test]
fn settings_serialize_to_toml() {
    let rendered = toml::to_string(&Settings::default()).unwrap();
    assert!(rendered.contains("[server]"));
    assert!(rendered.contains("interval_ms = 2000"));

    let back: Settings = toml::from_str(&rendered).unwrap();
    assert_eq!(back.ui.now_playing_fields, Settings::default().ui.now_playing_fields);
}
