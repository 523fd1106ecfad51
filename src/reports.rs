use crate::analysis::AnalysisResult;
use crate::store::JsonLinesStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Phishing,
    Scam,
    Malware,
    FakeShop,
    IdentityTheft,
    CryptocurrencyScam,
    Other,
}

impl ReportType {
    pub const ALL: [ReportType; 7] = [
        ReportType::Phishing,
        ReportType::Scam,
        ReportType::Malware,
        ReportType::FakeShop,
        ReportType::IdentityTheft,
        ReportType::CryptocurrencyScam,
        ReportType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Phishing => "phishing",
            ReportType::Scam => "scam",
            ReportType::Malware => "malware",
            ReportType::FakeShop => "fake_shop",
            ReportType::IdentityTheft => "identity_theft",
            ReportType::CryptocurrencyScam => "cryptocurrency_scam",
            ReportType::Other => "other",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ReportError::UnknownType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
    Blocked,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 5] = [
        ReportStatus::Pending,
        ReportStatus::Reviewing,
        ReportStatus::Approved,
        ReportStatus::Rejected,
        ReportStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewing => "reviewing",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ReportError::UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReportError {
    #[error("A report needs the URL being reported")]
    MissingUrl,
    #[error("Unknown report type: {0}")]
    UnknownType(String),
    #[error("Unknown report status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub url: String,
    pub report_type: ReportType,
    pub description: String,
    pub reporter_email: Option<String>,
    pub status: ReportStatus,
    pub risk_score: i32,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// A pending report carrying the engine's score for the reported URL.
    pub fn new(
        analysis: &AnalysisResult,
        report_type: ReportType,
        description: &str,
        reporter_email: Option<&str>,
    ) -> Result<Self, ReportError> {
        let url = analysis.url.trim();
        if url.is_empty() {
            return Err(ReportError::MissingUrl);
        }

        Ok(Self {
            url: url.to_string(),
            report_type,
            description: description.trim().to_string(),
            reporter_email: reporter_email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            status: ReportStatus::Pending,
            risk_score: analysis.risk_score,
            admin_notes: String::new(),
            created_at: Utc::now(),
        })
    }
}

pub struct ReportStore {
    store: JsonLinesStore<Report>,
}

impl ReportStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            store: JsonLinesStore::new(path),
        }
    }

    pub fn submit(&self, report: &Report) -> Result<()> {
        self.store.append(report)?;
        log::info!(
            "Report received for {} ({}, score {})",
            report.url,
            report.report_type,
            report.risk_score
        );
        Ok(())
    }

    /// Newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Report>> {
        let mut reports = self.store.load()?;
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(limit);
        Ok(reports)
    }

    /// Set the review outcome on every report for `url`. Blocked reports
    /// keep their status. Returns how many changed.
    pub fn review(&self, url: &str, status: ReportStatus, notes: Option<&str>) -> Result<usize> {
        let mut reports = self.store.load()?;
        let mut changed = 0;
        for report in reports.iter_mut() {
            if report.url != url || report.status == ReportStatus::Blocked {
                continue;
            }
            report.status = status;
            if let Some(notes) = notes {
                report.admin_notes = notes.trim().to_string();
            }
            changed += 1;
        }
        if changed > 0 {
            self.store.rewrite(&reports)?;
            log::info!("Report for {} marked {}", url, status);
        }
        Ok(changed)
    }

    /// Mark every pending report for `url` as blocked.
    pub fn mark_blocked(&self, url: &str) -> Result<usize> {
        let mut reports = self.store.load()?;
        let mut changed = 0;
        for report in reports.iter_mut() {
            if report.url == url && report.status == ReportStatus::Pending {
                report.status = ReportStatus::Blocked;
                changed += 1;
            }
        }
        if changed > 0 {
            self.store.rewrite(&reports)?;
        }
        Ok(changed)
    }
}
