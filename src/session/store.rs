//! Best-score persistence

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct BestScoreRecord {
    best_score: u32,
}

/// The single best score, optionally backed by a JSON file
#[derive(Debug, Clone, Default)]
pub struct BestScoreStore {
    path: Option<PathBuf>,
    best: u32,
}

impl BestScoreStore {
    /// Store that lives only as long as the process
    pub fn in_memory(best: u32) -> Self {
        Self { path: None, best }
    }

    /// Load the best score from `path`; a missing file means no record yet
    pub fn load(path: &Path) -> Result<Self> {
        let best = if path.exists() {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read best score from {}", path.display()))?;
            let record: BestScoreRecord =
                serde_json::from_str(&json).context("Failed to deserialize best score")?;
            record.best_score
        } else {
            0
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            best,
        })
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Offer a final score. Returns true if it beat the stored best and was saved.
    pub fn submit(&mut self, score: u32) -> Result<bool> {
        if score <= self.best {
            return Ok(false);
        }
        self.best = score;
        self.save()?;
        info!("New best score {}", score);
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&BestScoreRecord {
            best_score: self.best,
        })
        .context("Failed to serialize best score")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write best score to {}", path.display()))?;
        Ok(())
    }
}
