pub mod domain_analyzer;
pub mod pattern_matcher;
pub mod protocol_analyzer;
pub mod url_structure;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "green",
            RiskLevel::Low => "orange",
            RiskLevel::Medium => "yellow",
            RiskLevel::High => "red",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bound (inclusive) of each tier above `Safe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high: i32,
    pub medium: i32,
    pub low: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: 70,
            medium: 40,
            low: 20,
        }
    }
}

impl Thresholds {
    pub fn level_for(&self, score: i32) -> RiskLevel {
        match score {
            s if s >= self.high => RiskLevel::High,
            s if s >= self.medium => RiskLevel::Medium,
            s if s >= self.low => RiskLevel::Low,
            _ => RiskLevel::Safe,
        }
    }

    pub fn classify(&self, score: i32) -> Classification {
        let level = self.level_for(score);
        Classification {
            level,
            label: level.label(),
            color: level.color(),
        }
    }
}

/// Display-oriented view of a score for report and UI consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub level: RiskLevel,
    pub label: &'static str,
    pub color: &'static str,
}
