//! Configuration management for learnpath

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// How remote skill XP is merged with locally cached XP on load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillMergePolicy {
    /// A numeric remote value replaces the local one
    #[default]
    RemoteWins,
    /// Keep whichever of local and remote XP is larger
    Max,
}

/// How a lesson missing from the course sequence is gated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingLessonPolicy {
    /// Unknown lessons are never locked
    #[default]
    Unlocked,
    /// Unknown lessons are always locked
    Locked,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the progress API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for remote requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Minutes credited to time spent for each completed lesson
    #[serde(default = "default_minutes_per_lesson")]
    pub minutes_per_lesson: u64,

    #[serde(default)]
    pub skill_merge: SkillMergePolicy,

    #[serde(default)]
    pub missing_lesson_policy: MissingLessonPolicy,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_minutes_per_lesson() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            minutes_per_lesson: default_minutes_per_lesson(),
            skill_merge: SkillMergePolicy::default(),
            missing_lesson_policy: MissingLessonPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "learnpath")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "learnpath").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Get the local cache directory path
    pub fn cache_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("cache"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_local_api() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.minutes_per_lesson, 15);
    }

    #[test]
    fn default_policies_follow_remote_and_unlock_unknown() {
        let config = Config::default();
        assert_eq!(config.skill_merge, SkillMergePolicy::RemoteWins);
        assert_eq!(config.missing_lesson_policy, MissingLessonPolicy::Unlocked);
    }

    #[test]
    fn config_serializes_to_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("remote_wins"));
        assert!(json.contains("localhost:8000"));
    }

    #[test]
    fn config_deserializes_partial_json() {
        let json = r#"{"api_url":"https://learn.example.com","skill_merge":"max"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_url, "https://learn.example.com");
        assert_eq!(config.skill_merge, SkillMergePolicy::Max);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
