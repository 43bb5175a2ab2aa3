use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{what}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("label {label} is out of range for {num_classes} classes")]
    LabelOutOfRange { label: usize, num_classes: usize },

    #[error("invalid training config: {0}")]
    InvalidConfig(String),

    #[error("invalid model record: {0}")]
    InvalidRecord(String),

    #[error("training history is empty, nothing to plot")]
    EmptyHistory,

    #[error("I/O error on '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not (de)serialize model record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not draw plot: {0}")]
    Plot(String),
}
