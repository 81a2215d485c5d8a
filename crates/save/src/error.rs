use thiserror::Error;

/// Why a stored blob could not be turned back into game state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("malformed json: {0}")]
    Json(String),
    #[error("grid must be {expected}x{expected}, found {rows} rows")]
    GridShape { expected: u8, rows: usize },
    #[error("grid row {row} has {len} cells")]
    GridRow { row: usize, len: usize },
    #[error("queue holds {0} slots")]
    QueueLength(usize),
    #[error("unknown shape id {0:?}")]
    UnknownShape(String),
    #[error("unknown {field} {value:?}")]
    UnknownName { field: &'static str, value: String },
    #[error("bad colour {0:?}")]
    BadColor(String),
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SaveError>;
