pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod extraction;
pub mod frequency;
pub mod ingestion;
pub mod matching;
pub mod outputs;
pub mod persistence;

pub use lotterystat_parser as parser;

pub use config::Config;
pub use error::{PipelineError, Result};
