use lotterystat_parser::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("duplicate entry: table {table} already holds draw {draw_no}")]
    DuplicateEntry { table: &'static str, draw_no: u64 },

    #[error("failed to create table {table}: {source}")]
    CreateTable {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to insert draw {draw_no} into {table}: {source}")]
    Insert {
        table: &'static str,
        draw_no: u64,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to query {table}: {source}")]
    Query {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Data processing error: {0}")]
    Processing(String),
}

impl PipelineError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, PipelineError::DuplicateEntry { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
