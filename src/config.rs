use crate::app_error::{AppError, AppResult};
use crate::session_tracker::{TrackerSettings, DEFAULT_EXERCISE_LABEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "workout-session";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub tick_interval_secs: u64,
    pub idle_exercise_label: String,
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tick_interval_secs: 1,
            idle_exercise_label: DEFAULT_EXERCISE_LABEL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    pub fn parse(contents: &str, origin: &Path) -> AppResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|err| AppError::config(origin, err.to_string()))?;
        config.validate(origin)?;
        Ok(config)
    }

    pub fn settings(&self) -> TrackerSettings {
        TrackerSettings {
            tick_interval: Duration::from_secs(self.tick_interval_secs),
            idle_exercise_label: self.idle_exercise_label.clone(),
        }
    }

    fn validate(&self, origin: &Path) -> AppResult<()> {
        if self.tick_interval_secs == 0 {
            return Err(AppError::config(
                origin,
                "tick_interval_secs must be at least 1",
            ));
        }
        if self.idle_exercise_label.trim().is_empty() {
            return Err(AppError::config(
                origin,
                "idle_exercise_label must not be empty",
            ));
        }
        Ok(())
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::TrackerConfig;
    use crate::app_error::AppError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let config = TrackerConfig::parse(
            "data_dir = \"/var/lib/workouts\"\nlog_level = \"debug\"\n",
            Path::new("config.toml"),
        )
        .expect("parse");

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/workouts"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.tick_interval_secs, 1);
        assert_eq!(config.settings().tick_interval, Duration::from_secs(1));
        assert_eq!(config.settings().idle_exercise_label, "No exercise");
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let err = TrackerConfig::parse("tick_interval_secs = 0", Path::new("config.toml"))
            .expect_err("should fail");
        assert!(matches!(err, AppError::Config { .. }));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "tick_interval_secs = \"soon\"").expect("write");

        let err = TrackerConfig::load(&path).expect_err("should fail");
        match err {
            AppError::Config { path: origin, .. } => assert_eq!(origin, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = TrackerConfig::load(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(config, TrackerConfig::default());
    }
}
