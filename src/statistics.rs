use crate::features::RiskLevel;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counters {
    pub scan_count: u64,
    pub report_count: u64,
    pub blocked_count: u64,
    /// Scans per risk level
    #[serde(default)]
    pub by_level: BTreeMap<RiskLevel, u64>,
    /// Occurrences of each threat tag across all scans
    #[serde(default)]
    pub threat_counts: BTreeMap<String, u64>,
    pub start_time: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Counters {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            scan_count: 0,
            report_count: 0,
            blocked_count: 0,
            by_level: BTreeMap::new(),
            threat_counts: BTreeMap::new(),
            start_time: now,
            last_updated: now,
        }
    }

    pub fn apply(&mut self, event: StatEvent) {
        self.last_updated = Utc::now();

        match event {
            StatEvent::UrlScanned {
                risk_level,
                threats,
            } => {
                self.scan_count += 1;
                *self.by_level.entry(risk_level).or_insert(0) += 1;
                for threat in threats {
                    *self.threat_counts.entry(threat).or_insert(0) += 1;
                }
            }
            StatEvent::ReportSubmitted => {
                self.report_count += 1;
            }
            StatEvent::UrlBlocked => {
                self.blocked_count += 1;
            }
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum StatEvent {
    UrlScanned {
        risk_level: RiskLevel,
        threats: Vec<String>,
    },
    ReportSubmitted,
    UrlBlocked,
}

/// Collects counter events off the caller's path and persists them from a
/// background task.
pub struct StatisticsCollector {
    sender: mpsc::UnboundedSender<StatEvent>,
    handle: tokio::task::JoinHandle<()>,
}

impl StatisticsCollector {
    /// Must be called from within a tokio runtime.
    pub fn new<P: AsRef<Path>>(path: P, flush_interval_seconds: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create stats directory: {}", parent.display())
                })?;
            }
        }

        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            if let Err(e) = Self::stats_worker(path, receiver, flush_interval_seconds).await {
                log::error!("Statistics worker error: {e}");
            }
        });

        Ok(Self { sender, handle })
    }

    pub fn record_event(&self, event: StatEvent) {
        if let Err(e) = self.sender.send(event) {
            log::warn!("Failed to send statistics event: {e}");
        }
    }

    /// Close the channel and wait for the final flush.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.sender);
        self.handle
            .await
            .context("Statistics worker terminated abnormally")?;
        Ok(())
    }

    async fn stats_worker(
        path: PathBuf,
        mut receiver: mpsc::UnboundedReceiver<StatEvent>,
        flush_interval_seconds: u64,
    ) -> Result<()> {
        let mut counters = load_counters(&path)?;
        let mut dirty = false;
        let mut flush_timer = interval(Duration::from_secs(flush_interval_seconds.max(1)));

        loop {
            tokio::select! {
                event = receiver.recv() => {
                    match event {
                        Some(event) => {
                            counters.apply(event);
                            dirty = true;
                        }
                        None => {
                            // Channel closed, flush and exit
                            if dirty {
                                save_counters(&path, &counters)?;
                            }
                            break;
                        }
                    }
                }
                _ = flush_timer.tick() => {
                    if dirty {
                        if let Err(e) = save_counters(&path, &counters) {
                            log::error!("Failed to flush statistics: {e}");
                        } else {
                            dirty = false;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Persisted counters, or fresh ones if nothing has been written yet.
pub fn load_counters(path: &Path) -> Result<Counters> {
    if !path.exists() {
        return Ok(Counters::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read statistics: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse statistics: {}", path.display()))
}

pub fn save_counters(path: &Path, counters: &Counters) -> Result<()> {
    let json = serde_json::to_string_pretty(counters)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("Failed to write statistics: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace statistics: {}", path.display()))?;
    Ok(())
}

pub fn reset_counters(path: &Path) -> Result<()> {
    save_counters(path, &Counters::new())
}
