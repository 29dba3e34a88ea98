mod config;
mod draw;
mod registry;
mod table;

pub use draw::TableDraw;
pub use registry::{TableRegistry, PANIC_TABLE_ID};
pub use table::{RollTable, TableEntry};

use std::path::PathBuf;
use thiserror::Error;

/// Error loading roll table configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
}

/// Error building or rolling a roll table
#[derive(Debug, Error)]
pub enum RollError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Table '{table}' has an inverted range {min}..{max}")]
    InvalidRange { table: String, min: i64, max: i64 },
    #[error("Table '{table}' has overlapping ranges at {at}")]
    OverlappingRanges { table: String, at: i64 },
    #[error("Table '{table}' rolls {dice}d{faces}")]
    InvalidDice { table: String, dice: u32, faces: u32 },
}
