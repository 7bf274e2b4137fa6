use crate::error::{IoError, Result};
use chrono::{DateTime, Utc};
use flapper_core::generation::{GenerationOutcome, Termination};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const HISTORY_FILE: &str = "generations.jsonl";

/// One line of the generation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub generation: u64,
    pub score: u32,
    pub ticks: u64,
    pub population: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub termination: Termination,
    pub config_fingerprint: String,
}

impl GenerationRecord {
    #[must_use]
    pub fn from_outcome<D>(run_id: Uuid, outcome: &GenerationOutcome<D>, fingerprint: &str) -> Self {
        Self {
            run_id,
            timestamp: Utc::now(),
            generation: outcome.generation,
            score: outcome.score,
            ticks: outcome.ticks,
            population: outcome.results.len(),
            best_fitness: outcome.best_fitness().unwrap_or(0.0),
            mean_fitness: outcome.mean_fitness().unwrap_or(0.0),
            termination: outcome.termination,
            config_fingerprint: fingerprint.to_string(),
        }
    }
}

/// Appends finished generations to `<dir>/generations.jsonl`.
pub struct HistoryLogger {
    file: Option<BufWriter<File>>,
    path: PathBuf,
}

impl HistoryLogger {
    pub fn new_at(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .map_err(|e| IoError::from(e).with_context(format!("creating {}", dir.display())))?;
        }
        let path = dir.join(HISTORY_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Some(BufWriter::new(file)),
            path,
        })
    }

    /// Logger that drops everything, for runs without a log directory.
    #[must_use]
    pub fn new_dummy() -> Self {
        Self {
            file: None,
            path: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_generation(&mut self, record: &GenerationRecord) -> Result<()> {
        if let Some(ref mut file) = self.file {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{json}")?;
            file.flush()?;
        }
        Ok(())
    }

    /// Reads every record back. Malformed lines are skipped with a warning.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<GenerationRecord>> {
        let file = match File::open(path.as_ref()) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GenerationRecord>(&line) {
                Ok(r) => records.push(r),
                Err(e) => tracing::warn!(line = n + 1, error = %e, "Skipping malformed history line"),
            }
        }
        Ok(records)
    }
}
