pub mod analysis;
pub mod blocklist;
pub mod config;
pub mod domain_utils;
pub mod engine;
pub mod error;
pub mod features;
pub mod history;
pub mod output;
pub mod recommendations;
pub mod reports;
pub mod statistics;
pub mod store;

pub use analysis::{AnalysisDetails, AnalysisResult};
pub use config::rules::{RuleConfig, RuleSet};
pub use config::Config;
pub use engine::UrlRiskEngine;
pub use error::EngineError;
pub use features::{Classification, RiskLevel, Thresholds};
pub use statistics::{StatEvent, StatisticsCollector};
