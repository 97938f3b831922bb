use std::fmt;

use thiserror::Error;

use crate::model::Game;

/// Failure of a single field decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid date format '{value}': expected D-Mon-YYYY")]
    InvalidDateFormat { value: String },

    #[error("invalid day format '{value}'")]
    InvalidDayFormat { value: String },

    #[error("invalid year format '{value}'")]
    InvalidYearFormat { value: String },

    #[error("invalid month '{value}'")]
    InvalidMonth { value: String },

    #[error("invalid day in the month: {day} {month} {year}")]
    InvalidDaysInMonth {
        day: i64,
        month: &'static str,
        year: i32,
    },

    #[error("invalid draw digit '{value}'")]
    InvalidDrawDigit { value: String },

    #[error("draw out of range: got {value} max {max}")]
    InvalidDrawRange { value: i64, max: u8 },

    #[error("invalid draw seq '{value}'")]
    InvalidDrawSeq { value: String },
}

/// The field of a draw row a decode failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawField {
    DrawDate,
    /// Main ball, 1-based position.
    Ball(usize),
    /// Secondary value (lucky star, bonus ball, ...), 1-based position.
    Secondary(&'static str, usize),
    DrawNo,
}

impl fmt::Display for DrawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawField::DrawDate => f.write_str("draw date"),
            DrawField::Ball(position) => write!(f, "ball {position}"),
            DrawField::Secondary(label, position) => write!(f, "{label} {position}"),
            DrawField::DrawNo => f.write_str("draw number"),
        }
    }
}

/// Failure of a schema adapter on one row. Only the first failing field, in
/// decode order, is ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("{game} row has {found} columns, expected {expected}")]
    ColumnCount {
        game: Game,
        expected: usize,
        found: usize,
    },

    #[error("{game} {field}: {source}")]
    InvalidField {
        game: Game,
        field: DrawField,
        #[source]
        source: DecodeError,
    },
}

impl DrawError {
    pub fn field(&self) -> Option<DrawField> {
        match self {
            DrawError::InvalidField { field, .. } => Some(*field),
            DrawError::ColumnCount { .. } => None,
        }
    }

    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            DrawError::InvalidField { source, .. } => Some(source),
            DrawError::ColumnCount { .. } => None,
        }
    }
}

/// A row the extractor could not turn into a clean field array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("unable to process line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("unable to process line {line}: invalid UTF-8 in field {field}")]
    Encoding { line: u64, field: usize },

    #[error("unable to process line {line}: {message}")]
    Malformed { line: u64, message: String },
}

impl LineError {
    pub fn line(&self) -> u64 {
        match self {
            LineError::FieldCount { line, .. }
            | LineError::Encoding { line, .. }
            | LineError::Malformed { line, .. } => *line,
        }
    }
}

/// Per-record failure carried by an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Line(#[from] LineError),

    #[error(transparent)]
    Draw(#[from] DrawError),
}

/// Fatal extraction failure: the underlying reader could not be read.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read CSV header: {source}")]
    Header {
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV stream at line {line}: {source}")]
    Read {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// A bet argument that does not fit the game's rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BetError {
    #[error("{game} bet must have {expected} main numbers, found {found}")]
    MainCount {
        game: Game,
        expected: usize,
        found: usize,
    },

    #[error("{game} bet must have {expected} {label} numbers, found {found}")]
    SecondaryCount {
        game: Game,
        label: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{game} bet number {value} repeated")]
    Repeated { game: Game, value: u8 },

    #[error("{game} bet value invalid: {source}")]
    InvalidValue {
        game: Game,
        #[source]
        source: DecodeError,
    },
}
