use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

use crate::assistant::DEFAULT_ENDPOINT;
use crate::pomodoro::PomodoroSettings;

/// Overrides the completion endpoint stored in the config file
pub const ENDPOINT_ENV: &str = "FOCUSDECK_ASSISTANT_URL";

/// User preferences. Tasks, notes and conversations are never written here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub assistant_endpoint: Option<String>,
    pub dark_mode: Option<bool>,
    pub pomodoro: Option<PomodoroSettings>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Env var first, then the config file, then the built-in endpoint
    pub fn assistant_endpoint(&self) -> String {
        std::env::var(ENDPOINT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.assistant_endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn pomodoro_settings(&self) -> PomodoroSettings {
        self.pomodoro.unwrap_or_default()
    }

    pub fn is_dark(&self) -> bool {
        self.dark_mode.unwrap_or(true)
    }

    pub fn save_pomodoro_settings(settings: PomodoroSettings) -> Result<()> {
        Self::update_file(&Self::get_config_path()?, |config| config.pomodoro = Some(settings))
    }

    pub fn save_dark_mode(dark: bool) -> Result<()> {
        Self::update_file(&Self::get_config_path()?, |config| config.dark_mode = Some(dark))
    }

    /// Read-modify-write one preference. An unreadable file is left as it is.
    fn update_file(config_path: &Path, apply: impl FnOnce(&mut Config)) -> Result<()> {
        let mut config = Self::load_from(config_path)?;
        apply(&mut config);
        config.save_to(config_path)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("focusdeck").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert!(config.is_dark());
        assert_eq!(config.pomodoro_settings(), PomodoroSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            assistant_endpoint: Some("http://localhost:8080/llm".to_string()),
            dark_mode: Some(false),
            pomodoro: Some(PomodoroSettings {
                work_duration: 50,
                short_break_duration: 10,
                long_break_duration: 30,
                sessions_before_long_break: 2,
                waiting_time: 1,
            }),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.is_dark());
        assert_eq!(loaded.pomodoro_settings().work_duration, 50);
    }

    #[test]
    fn test_endpoint_resolution() {
        if std::env::var(ENDPOINT_ENV).is_ok() {
            return;
        }
        assert_eq!(Config::new().assistant_endpoint(), DEFAULT_ENDPOINT);
        let config = Config {
            assistant_endpoint: Some("http://127.0.0.1:9000/llm".to_string()),
            ..Config::new()
        };
        assert_eq!(config.assistant_endpoint(), "http://127.0.0.1:9000/llm");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_update_keeps_other_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"assistant_endpoint": "http://mine", "dark_mode": false}"#).unwrap();

        Config::update_file(&path, |c| c.pomodoro = Some(PomodoroSettings::default())).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.assistant_endpoint.as_deref(), Some("http://mine"));
        assert!(!config.is_dark());
        assert_eq!(config.pomodoro, Some(PomodoroSettings::default()));
    }

    #[test]
    fn test_update_refuses_to_overwrite_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let broken = r#"{"assistant_endpoint": "http://mine", "dark_mode": false,"#;
        fs::write(&path, broken).unwrap();

        let err = Config::update_file(&path, |c| c.dark_mode = Some(true)).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"dark_mode": false}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(!config.is_dark());
        assert!(config.pomodoro.is_none());
    }
}
