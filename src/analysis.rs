use crate::features::domain_analyzer::DomainResult;
use crate::features::pattern_matcher::PatternResult;
use crate::features::protocol_analyzer::ProtocolResult;
use crate::features::url_structure::UrlStructureResult;
use crate::features::{RiskLevel, Thresholds};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const THREAT_INVALID_URL: &str = "invalid URL format";
pub const THREAT_SUSPICIOUS_DOMAIN: &str = "suspicious domain";
pub const THREAT_INSECURE_CONNECTION: &str = "insecure connection";
pub const THREAT_MALICIOUS_PATTERN: &str = "malicious pattern detected";
pub const THREAT_SUSPICIOUS_REDIRECT: &str = "suspicious redirect";
pub const THREAT_HIGH_RISK: &str = "classified high-risk";
pub const THREAT_MEDIUM_RISK: &str = "classified medium-risk";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetails {
    pub domain: DomainResult,
    pub url_structure: UrlStructureResult,
    pub protocol: ProtocolResult,
    pub patterns: PatternResult,
}

impl AnalysisDetails {
    pub fn total_score(&self) -> i32 {
        self.domain.risk_score
            + self.url_structure.risk_score
            + self.protocol.risk_score
            + self.patterns.risk_score
    }

    /// Threat tags in fixed order, ending with the tier tag for `score`.
    pub fn collect_threats(&self, score: i32, thresholds: &Thresholds) -> Vec<String> {
        let mut threats = Vec::new();

        if self.domain.is_suspicious {
            threats.push(THREAT_SUSPICIOUS_DOMAIN.to_string());
        }
        if self.protocol.risk_score > 0 {
            threats.push(THREAT_INSECURE_CONNECTION.to_string());
        }
        if !self.patterns.matched_patterns.is_empty() {
            threats.push(THREAT_MALICIOUS_PATTERN.to_string());
        }
        if self.url_structure.has_redirect {
            threats.push(THREAT_SUSPICIOUS_REDIRECT.to_string());
        }

        if score >= thresholds.high {
            threats.push(THREAT_HIGH_RISK.to_string());
        } else if score >= thresholds.medium {
            threats.push(THREAT_MEDIUM_RISK.to_string());
        }

        threats
    }
}

/// Outcome of a single URL analysis. `details` is absent only for
/// input that could not be parsed as a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub threats: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<AnalysisDetails>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn is_unparseable(&self) -> bool {
        self.details.is_none()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.domain.hostname.as_str())
    }

    pub fn is_secure(&self) -> bool {
        self.details
            .as_ref()
            .map(|d| d.protocol.is_secure)
            .unwrap_or(false)
    }

    /// Score clamped to 0..=100 for progress bars and badges.
    /// Classification always uses the raw `risk_score`.
    pub fn display_score(&self) -> i32 {
        self.risk_score.clamp(0, 100)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
