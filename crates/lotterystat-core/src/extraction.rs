use std::io::Read;

use lotterystat_parser::{RawRecord, RecordReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Result;

/// Options for one extraction run.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Field count every row must have. Defaults to the header's.
    pub expected_fields: Option<usize>,
    pub channel_capacity: usize,
}

/// What an extraction run did before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub sent: u64,
    /// Whether the run stopped on the cancellation token before the end of
    /// the input.
    pub cancelled: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            expected_fields: None,
            channel_capacity: 256,
        }
    }
}

/// Streams the records of `source` into a bounded channel from a blocking
/// task.
///
/// The returned handle resolves to an [`ExtractSummary`]. It resolves to an
/// error only when the underlying reader fails; malformed rows travel through
/// the channel as tagged records. Cancellation is checked before every line
/// and closes the channel early without an error.
pub fn spawn_extraction<R>(
    source: R,
    options: ExtractOptions,
    cancel: CancellationToken,
) -> (mpsc::Receiver<RawRecord>, JoinHandle<Result<ExtractSummary>>)
where
    R: Read + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(options.channel_capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || -> Result<ExtractSummary> {
        let mut reader = RecordReader::new(source);
        if let Some(count) = options.expected_fields {
            reader = reader.expect_fields(count);
        }

        let mut sent = 0u64;
        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                info!(line = reader.line(), sent, "Extraction cancelled");
                cancelled = true;
                break;
            }
            let Some(item) = reader.next() else {
                break;
            };
            let record = item?;
            if sender.blocking_send(record).is_err() {
                debug!(sent, "Record receiver dropped, stopping extraction");
                break;
            }
            sent += 1;
        }

        debug!(sent, cancelled, "Extraction finished");
        Ok(ExtractSummary { sent, cancelled })
    });

    (receiver, handle)
}
