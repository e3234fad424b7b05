use thiserror::Error;

/// Errors raised while building or parsing a [`Grid`](crate::Grid).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must be non-empty (got {width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("map has no rows")]
    NoRows,

    #[error("row {line} has {found} columns, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown map glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph {
        glyph: char,
        line: usize,
        column: usize,
    },

    #[error("invalid position {0:?}, expected \"x,y\"")]
    InvalidPosition(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
