use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Append-only JSON-lines file holding records of one type.
#[derive(Debug, Clone)]
pub struct JsonLinesStore<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> JsonLinesStore<T> {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _record: PhantomData,
        }
    }

    pub fn append(&self, record: &T) -> Result<()> {
        self.ensure_parent()?;

        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{line}")
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// All records in file order. A missing file is an empty store; lines
    /// that fail to parse are skipped with a warning.
    pub fn load(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let mut records = Vec::new();

        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!(
                    "Skipping malformed record at {}:{}: {}",
                    self.path.display(),
                    number + 1,
                    e
                ),
            }
        }

        Ok(records)
    }

    /// Replace the file contents with `records`.
    pub fn rewrite(&self, records: &[T]) -> Result<()> {
        self.ensure_parent()?;

        let mut content = String::new();
        for record in records {
            content.push_str(&serde_json::to_string(record).context("Failed to serialize record")?);
            content.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory: {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}
