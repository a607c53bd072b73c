use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::input::keys::KEYS_PROMPT;
use crate::input::touch::TOUCH_PROMPT;

/// Which input adapters are wired to the tracker
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Keys,
    Mouse,
    Both,
}

impl InputMode {
    pub fn uses_keys(&self) -> bool {
        matches!(self, InputMode::Keys | InputMode::Both)
    }

    pub fn uses_mouse(&self) -> bool {
        matches!(self, InputMode::Mouse | InputMode::Both)
    }

    pub fn idle_prompt(&self) -> &'static str {
        match self {
            InputMode::Keys => KEYS_PROMPT,
            InputMode::Mouse => TOUCH_PROMPT,
            InputMode::Both => "Hold a key (A-Z, 0-9) or a mouse button",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub decision_delay_ms: u64,
    pub input_mode: InputMode,
    pub bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decision_delay_ms: 1000,
            input_mode: InputMode::Both,
            bell: true,
        }
    }
}

impl Config {
    pub fn decision_delay(&self) -> Duration {
        Duration::from_millis(self.decision_delay_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "pickr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("pickr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to the defaults.
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring corrupt config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("pickr").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            decision_delay_ms: 2500,
            input_mode: InputMode::Keys,
            bell: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "input_mode": "mouse" }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.input_mode, InputMode::Mouse);
        assert_eq!(cfg.decision_delay(), Duration::from_millis(1000));
        assert!(cfg.bell);
    }

    #[test]
    fn input_mode_flags() {
        assert!(InputMode::Both.uses_keys() && InputMode::Both.uses_mouse());
        assert!(!InputMode::Keys.uses_mouse());
        assert!(!InputMode::Mouse.uses_keys());
        assert_eq!(InputMode::Keys.idle_prompt(), KEYS_PROMPT);
        assert_eq!(InputMode::Mouse.to_string(), "Mouse");
    }
}
