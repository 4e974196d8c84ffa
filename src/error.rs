use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrnError {
    #[error("Config directory not found at {0}. Run 'grn init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to read rows from {path}: {source}")]
    RowsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write state: {0}")]
    StateWrite(#[from] toml::ser::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid filter '{clause}': {reason}")]
    InvalidFilter { clause: String, reason: String },

    #[error("Unknown filter prefix '{0}'. Use LIKE, NOT_LIKE, IN, NOT_IN, LESS_THAN or GREATER_THAN.")]
    UnknownPrefix(String),

    #[error("Invalid edit '{0}'. Expected 'field=value' (e.g., 'rate=12.5')")]
    InvalidEdit(String),

    #[error("Field '{0}' is derived and cannot be set directly")]
    DerivedField(String),

    #[error("Unknown payment field '{0}'")]
    UnknownChargeField(String),

    #[error("GRN '{0}' not found")]
    GrnNotFound(String),

    #[error("Invalid GRN index '{0}'. Use 'grn list' to see available GRNs.")]
    InvalidGrnIndex(String),

    #[error("Invalid line {line} for {grn} (only {count} item(s))")]
    InvalidLine {
        grn: String,
        line: usize,
        count: usize,
    },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GrnError>;
