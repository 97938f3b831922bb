use std::io::Read;

use lotterystat_parser::{adapter_for, Game, RecordError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::DbPool;
use crate::dispatch::process_records;
use crate::error::Result;
use crate::extraction::{spawn_extraction, ExtractOptions};
use crate::persistence::{create_table, persist_draw};

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub workers: usize,
    pub channel_capacity: usize,
    /// Check rows against the header's field count rather than the game's
    /// column count.
    pub header_columns: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            channel_capacity: 256,
            header_columns: false,
        }
    }
}

impl From<&Config> for ImportOptions {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.workers,
            channel_capacity: config.channel_capacity,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Duplicate,
    DecodeFailed,
    PersistFailed,
}

/// A record that was not inserted, and why.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub line: u64,
    pub status: RecordStatus,
    pub draw_no: Option<u64>,
    pub message: String,
    #[serde(skip)]
    pub error: Option<RecordError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub game: Game,
    pub total: usize,
    pub decoded: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub decode_failures: usize,
    pub persist_failures: usize,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RecordReport>,
}

impl ImportReport {
    fn new(game: Game) -> Self {
        Self {
            game,
            total: 0,
            decoded: 0,
            inserted: 0,
            duplicates: 0,
            decode_failures: 0,
            persist_failures: 0,
            cancelled: false,
            records: Vec::new(),
        }
    }
}

/// Extracts, decodes and stores every draw of `source`.
///
/// Record-level failures (malformed rows, invalid fields, duplicates, failed
/// inserts) are logged, counted and skipped. Only a read failure of `source`
/// aborts the import, in which case nothing is stored. Records are inserted
/// in file order. Rows are checked against the game's column count unless
/// [`ImportOptions::header_columns`] is set.
pub async fn import_draws<R>(
    pool: &DbPool,
    source: R,
    game: Game,
    options: &ImportOptions,
    cancel: CancellationToken,
) -> Result<ImportReport>
where
    R: Read + Send + 'static,
{
    create_table(pool, game).await?;

    let schema = game.schema();
    let extract_options = ExtractOptions {
        expected_fields: (!options.header_columns).then_some(schema.column_count),
        channel_capacity: options.channel_capacity,
    };
    let (records, extraction) = spawn_extraction(source, extract_options, cancel);

    let mut outcomes = process_records(records, adapter_for(game), options.workers).await?;
    let extracted = extraction.await??;
    debug!(game = %game, extracted = extracted.sent, outcomes = outcomes.len(), "Records decoded");

    outcomes.sort_by_key(|outcome| outcome.line);

    let mut report = ImportReport::new(game);
    report.total = outcomes.len();
    report.cancelled = extracted.cancelled;

    for outcome in outcomes {
        let line = outcome.line;
        let draw = match outcome.result {
            Ok(draw) => draw,
            Err(err) => {
                warn!(game = %game, line, error = %err, "Skipping undecodable record");
                report.decode_failures += 1;
                report.records.push(RecordReport {
                    line,
                    status: RecordStatus::DecodeFailed,
                    draw_no: None,
                    message: err.to_string(),
                    error: Some(err),
                });
                continue;
            }
        };
        report.decoded += 1;

        match persist_draw(pool, &draw).await {
            Ok(()) => report.inserted += 1,
            Err(err) if err.is_duplicate() => {
                debug!(game = %game, line, draw_no = draw.draw_no, "Skipping duplicate draw");
                report.duplicates += 1;
                report.records.push(RecordReport {
                    line,
                    status: RecordStatus::Duplicate,
                    draw_no: Some(draw.draw_no),
                    message: err.to_string(),
                    error: None,
                });
            }
            Err(err) => {
                warn!(game = %game, line, draw_no = draw.draw_no, error = %err, "Failed to store draw");
                report.persist_failures += 1;
                report.records.push(RecordReport {
                    line,
                    status: RecordStatus::PersistFailed,
                    draw_no: Some(draw.draw_no),
                    message: err.to_string(),
                    error: None,
                });
            }
        }
    }

    info!(
        game = %game,
        total = report.total,
        inserted = report.inserted,
        duplicates = report.duplicates,
        decode_failures = report.decode_failures,
        persist_failures = report.persist_failures,
        cancelled = report.cancelled,
        "Import finished"
    );
    Ok(report)
}
