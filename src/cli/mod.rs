pub mod import;

use std::path::PathBuf;

use clap::Parser;

use crate::error::Result;
use crate::settings::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "gastos",
    about = "Import credit-card OFX statements, categorize spending and export a monthly spreadsheet."
)]
pub struct Cli {
    /// Directory searched recursively for .ofx files (default: ./ofxs)
    pub input_dir: Option<PathBuf>,
    /// SQLite database file (default: finance.db)
    #[arg(long)]
    pub db: Option<PathBuf>,
    /// Spreadsheet to write (default: gastos.xlsx)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Number of parse workers (default: one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,
    /// JSON file with default settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Settings from `--config` (if given) with command-line values on top.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = load_settings(self.config.as_deref())?;
        if let Some(dir) = &self.input_dir {
            settings.input_dir = dir.clone();
        }
        if let Some(db) = &self.db {
            settings.db_path = db.clone();
        }
        if let Some(output) = &self.output {
            settings.output_path = output.clone();
        }
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        Ok(settings)
    }
}
