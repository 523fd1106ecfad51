use crate::analysis::AnalysisResult;
use crate::features::RiskLevel;
use crate::store::JsonLinesStore;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Score above which a scan counts as a detected threat in summaries
pub const THREAT_SCORE: i32 = 70;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub url: String,
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub threats_detected: Vec<String>,
    pub scanned_at: DateTime<Utc>,
    pub scan_result: AnalysisResult,
}

impl From<&AnalysisResult> for ScanRecord {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            url: result.url.clone(),
            risk_score: result.risk_score,
            risk_level: result.risk_level,
            threats_detected: result.threats.clone(),
            scanned_at: result.timestamp,
            scan_result: result.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_scans: usize,
    pub threats_detected: usize,
    pub scans_today: usize,
    pub average_score: f64,
    pub by_level: BTreeMap<RiskLevel, usize>,
}

impl HistorySummary {
    pub fn from_records(records: &[ScanRecord], today: NaiveDate) -> Self {
        let mut by_level = BTreeMap::new();
        for level in [
            RiskLevel::Safe,
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
        ] {
            by_level.insert(level, 0);
        }

        let mut total_score: i64 = 0;
        let mut threats_detected = 0;
        let mut scans_today = 0;

        for record in records {
            *by_level.entry(record.risk_level).or_insert(0) += 1;
            total_score += i64::from(record.risk_score);
            if record.risk_score > THREAT_SCORE {
                threats_detected += 1;
            }
            if record.scanned_at.date_naive() == today {
                scans_today += 1;
            }
        }

        let average_score = if records.is_empty() {
            0.0
        } else {
            total_score as f64 / records.len() as f64
        };

        Self {
            total_scans: records.len(),
            threats_detected,
            scans_today,
            average_score,
            by_level,
        }
    }
}

/// Persistent scan history
pub struct ScanHistory {
    store: JsonLinesStore<ScanRecord>,
}

impl ScanHistory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            store: JsonLinesStore::new(path),
        }
    }

    pub fn record(&self, result: &AnalysisResult) -> Result<()> {
        self.store.append(&ScanRecord::from(result))
    }

    pub fn load(&self) -> Result<Vec<ScanRecord>> {
        self.store.load()
    }

    /// Most recent `limit` records, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<ScanRecord>> {
        let mut records = self.store.load()?;
        records.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at));
        records.truncate(limit);
        Ok(records)
    }

    pub fn summary(&self) -> Result<HistorySummary> {
        let records = self.store.load()?;
        Ok(HistorySummary::from_records(
            &records,
            Utc::now().date_naive(),
        ))
    }
}
