use crate::analysis::AnalysisResult;
use crate::config::BlockingConfig;
use crate::features::RiskLevel;
use crate::store::JsonLinesStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Phishing,
    Scam,
    Malware,
    Other,
}

impl BlockReason {
    /// Derive a reason from threat tags, most specific first.
    pub fn from_threats(threats: &[String]) -> Self {
        let any = |needle: &str| threats.iter().any(|t| t.to_lowercase().contains(needle));

        if any("phishing") {
            BlockReason::Phishing
        } else if any("scam") {
            BlockReason::Scam
        } else if any("malicious") {
            BlockReason::Malware
        } else {
            BlockReason::Other
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockReason::Phishing => "phishing",
            BlockReason::Scam => "scam",
            BlockReason::Malware => "malware",
            BlockReason::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSource {
    AutomatedDetection,
    UserReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub url: String,
    pub domain: String,
    pub risk_level: RiskLevel,
    pub block_reason: BlockReason,
    pub source: BlockSource,
    pub block_date: DateTime<Utc>,
    pub is_active: bool,
}

/// Decides when an analysis result should be blocked. Caller policy, not
/// part of scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPolicy {
    pub enabled: bool,
    pub min_score: i32,
}

impl From<&BlockingConfig> for BlockPolicy {
    fn from(config: &BlockingConfig) -> Self {
        Self {
            enabled: config.auto_block,
            min_score: config.min_score,
        }
    }
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self::from(&BlockingConfig::default())
    }
}

impl BlockPolicy {
    /// Automated scans block high-risk results at or above `min_score`;
    /// user reports block any high-risk result. Unparseable input has no
    /// hostname and is never blocked.
    pub fn evaluate(&self, result: &AnalysisResult, source: BlockSource) -> Option<BlockEntry> {
        if !self.enabled || result.risk_level != RiskLevel::High {
            return None;
        }
        if source == BlockSource::AutomatedDetection && result.risk_score < self.min_score {
            return None;
        }

        let domain = result.hostname()?;

        Some(BlockEntry {
            url: result.url.clone(),
            domain: domain.to_string(),
            risk_level: result.risk_level,
            block_reason: BlockReason::from_threats(&result.threats),
            source,
            block_date: Utc::now(),
            is_active: true,
        })
    }
}

pub struct Blocklist {
    store: JsonLinesStore<BlockEntry>,
}

impl Blocklist {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            store: JsonLinesStore::new(path),
        }
    }

    /// Add an entry. Returns `false` when the URL is already actively
    /// blocked, so retries do not duplicate entries.
    pub fn add(&self, entry: &BlockEntry) -> Result<bool> {
        if self.is_blocked(&entry.url)? {
            log::debug!("URL already blocked: {}", entry.url);
            return Ok(false);
        }

        self.store.append(entry)?;
        log::info!(
            "Blocked {} (domain {}, reason {})",
            entry.url,
            entry.domain,
            entry.block_reason
        );
        Ok(true)
    }

    pub fn is_blocked(&self, url: &str) -> Result<bool> {
        Ok(self
            .store
            .load()?
            .iter()
            .any(|entry| entry.is_active && entry.url == url))
    }

    pub fn active(&self) -> Result<Vec<BlockEntry>> {
        Ok(self
            .store
            .load()?
            .into_iter()
            .filter(|entry| entry.is_active)
            .collect())
    }

    /// Deactivate every active entry for `url`. Returns how many changed.
    pub fn unblock(&self, url: &str) -> Result<usize> {
        let mut entries = self.store.load()?;
        let mut changed = 0;

        for entry in entries.iter_mut() {
            if entry.is_active && entry.url == url {
                entry.is_active = false;
                changed += 1;
            }
        }

        if changed > 0 {
            self.store.rewrite(&entries)?;
            log::info!("Unblocked {}", url);
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::UrlRiskEngine;

    const HIGH_RISK_URL: &str = "http://a.b.c.win-free-cash-prize.tk/click here";

    fn engine() -> UrlRiskEngine {
        UrlRiskEngine::with_default_rules().unwrap()
    }

    #[test]
    fn test_reason_from_threats() {
        let tags = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(
            BlockReason::from_threats(&tags(&["malicious pattern detected"])),
            BlockReason::Malware
        );
        assert_eq!(
            BlockReason::from_threats(&tags(&["Phishing kit", "malicious pattern detected"])),
            BlockReason::Phishing
        );
        assert_eq!(
            BlockReason::from_threats(&tags(&["crypto scam"])),
            BlockReason::Scam
        );
        assert_eq!(
            BlockReason::from_threats(&tags(&["suspicious domain"])),
            BlockReason::Other
        );
    }

    #[test]
    fn test_automated_block_requires_min_score() {
        let policy = BlockPolicy::default();
        let engine = engine();

        let high = engine.analyze(HIGH_RISK_URL);
        assert!(high.risk_score >= 80);
        let entry = policy
            .evaluate(&high, BlockSource::AutomatedDetection)
            .unwrap();
        assert_eq!(entry.domain, "a.b.c.win-free-cash-prize.tk");
        assert_eq!(entry.block_reason, BlockReason::Malware);
        assert!(entry.is_active);

        // 75: high, but under the automated threshold
        let borderline = engine.analyze("http://123.45.67.89/verify-account-now?m=act now");
        assert_eq!(borderline.risk_level, RiskLevel::High);
        assert!(policy
            .evaluate(&borderline, BlockSource::AutomatedDetection)
            .is_none());
        assert!(policy.evaluate(&borderline, BlockSource::UserReport).is_some());
    }

    #[test]
    fn test_unparseable_and_disabled_never_block() {
        let engine = engine();
        let policy = BlockPolicy::default();
        assert!(policy
            .evaluate(&engine.analyze("not a url"), BlockSource::AutomatedDetection)
            .is_none());

        let disabled = BlockPolicy {
            enabled: false,
            min_score: 0,
        };
        assert!(disabled
            .evaluate(&engine.analyze(HIGH_RISK_URL), BlockSource::UserReport)
            .is_none());
    }

    #[test]
    fn test_add_is_idempotent_and_unblock() {
        let dir = tempfile::tempdir().unwrap();
        let blocklist = Blocklist::new(dir.path().join("blocked_urls.jsonl"));
        let entry = BlockPolicy::default()
            .evaluate(&engine().analyze(HIGH_RISK_URL), BlockSource::AutomatedDetection)
            .unwrap();

        assert!(blocklist.add(&entry).unwrap());
        assert!(!blocklist.add(&entry).unwrap());
        assert_eq!(blocklist.active().unwrap().len(), 1);

        assert_eq!(blocklist.unblock(HIGH_RISK_URL).unwrap(), 1);
        assert!(!blocklist.is_blocked(HIGH_RISK_URL).unwrap());
        assert_eq!(blocklist.unblock(HIGH_RISK_URL).unwrap(), 0);

        // Can be blocked again after being lifted
        assert!(blocklist.add(&entry).unwrap());
    }
}
