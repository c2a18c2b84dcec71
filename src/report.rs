use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Outcome of one finished episode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Rewards collected over the episode
    pub reward: f32,
    /// Whether the agent ended the episode on the menhir
    pub arrived: bool,
    /// Estimated turns to the menhir at the end of the episode
    pub dist: f32,
}

/// Episode outcomes collected during training, written out as CSV
#[derive(Debug)]
pub struct EpisodeLog {
    path: PathBuf,
    records: Vec<EpisodeRecord>,
}

impl EpisodeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn push(&mut self, record: EpisodeRecord) {
        self.records.push(record);
    }

    /// Write every record collected so far, replacing the file's previous contents
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(&self.path)?;
        if self.records.is_empty() {
            wtr.write_record(["reward", "arrived", "dist"])?;
        }
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        info!(
            "Wrote {} episodes to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }
}
