pub mod loader;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Rule file overriding the built-in rule set
    #[serde(default)]
    pub rules_file: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    pub statistics: Option<StatisticsConfig>,
    #[serde(default)]
    pub blocking: BlockingConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    pub data_dir: String,
    #[serde(default = "default_true")]
    pub history_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: ".clearnet".to_string(),
            history_enabled: true,
        }
    }
}

impl StorageConfig {
    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("scan_history.jsonl")
    }

    pub fn statistics_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("statistics.json")
    }

    pub fn blocklist_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("blocked_urls.jsonl")
    }

    pub fn reports_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("reports.jsonl")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StatisticsConfig {
    pub enabled: bool,
    pub flush_interval_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BlockingConfig {
    pub auto_block: bool,
    /// Automated detection blocks high-risk results at or above this score
    pub min_score: i32,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            auto_block: true,
            min_score: 80,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_file: None,
            storage: StorageConfig::default(),
            statistics: Some(StatisticsConfig {
                enabled: true,
                flush_interval_seconds: Some(30),
            }),
            blocking: BlockingConfig::default(),
            logging: Some(LoggingConfig {
                level: "info".to_string(),
            }),
        }
    }
}

impl Config {
    pub fn statistics_enabled(&self) -> bool {
        self.statistics.as_ref().map(|s| s.enabled).unwrap_or(false)
    }

    pub fn flush_interval_seconds(&self) -> u64 {
        self.statistics
            .as_ref()
            .and_then(|s| s.flush_interval_seconds)
            .unwrap_or(30)
            .max(1)
    }
}
