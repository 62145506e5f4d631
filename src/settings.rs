use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for `.ofx` statements.
    pub input_dir: PathBuf,
    pub db_path: PathBuf,
    /// Spreadsheet written at the end of each run.
    pub output_path: PathBuf,
    /// Parse workers; 0 means one per logical CPU.
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./ofxs"),
            db_path: PathBuf::from("finance.db"),
            output_path: PathBuf::from("gastos.xlsx"),
            workers: 0,
        }
    }
}

impl Settings {
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Reads a JSON settings file; fields it leaves out keep their defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(Settings::default()),
    }
}
