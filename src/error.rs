use std::path::PathBuf;

use thiserror::Error;

use crate::ofx::OfxError;

#[derive(Error, Debug)]
pub enum GastosError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("OFX error: {0}")]
    Ofx(#[from] OfxError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Refusing to store a transaction without a category")]
    EmptyCategory,

    #[error("Invalid stored date: {0}")]
    InvalidDate(String),

    #[error("Could not back up {path}: {source}")]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} database writes failed")]
    FailedWrites(usize),
}

impl From<serde_json::Error> for GastosError {
    fn from(e: serde_json::Error) -> Self {
        GastosError::Settings(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GastosError>;
