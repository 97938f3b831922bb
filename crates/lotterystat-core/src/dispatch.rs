use std::sync::Arc;

use lotterystat_parser::{decode_record, DrawAdapter, Outcome, RawRecord};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::Result;

/// Upper bound on concurrent decode workers.
pub const MAX_WORKERS: usize = 256;

/// Decodes every record of `records` on `workers` concurrent tasks.
///
/// Workers pull from one shared queue and push into one result channel.
/// Returns once the input is closed and drained and every worker has exited;
/// each input record yields exactly one outcome, in no particular order.
pub async fn process_records(
    records: mpsc::Receiver<RawRecord>,
    adapter: &'static dyn DrawAdapter,
    workers: usize,
) -> Result<Vec<Outcome>> {
    let workers = match workers {
        0 => {
            warn!("Worker count of 0 requested, using 1");
            1
        }
        n if n > MAX_WORKERS => {
            warn!(requested = n, max = MAX_WORKERS, "Worker count capped");
            MAX_WORKERS
        }
        n => n,
    };

    let queue = Arc::new(Mutex::new(records));
    let (sender, mut results) = mpsc::channel::<Outcome>(workers * 2);
    let mut tasks = JoinSet::new();

    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let sender = sender.clone();
        tasks.spawn(async move {
            let mut processed = 0usize;
            loop {
                let next = {
                    let mut queue = queue.lock().await;
                    queue.recv().await
                };
                let Some(raw) = next else {
                    break;
                };
                if sender.send(decode_record(adapter, raw)).await.is_err() {
                    debug!(worker_id, "Outcome receiver dropped, stopping");
                    break;
                }
                processed += 1;
            }
            debug!(worker_id, processed, "Decode worker finished");
            processed
        });
    }
    drop(sender);

    let mut outcomes = Vec::new();
    while let Some(outcome) = results.recv().await {
        outcomes.push(outcome);
    }
    while let Some(joined) = tasks.join_next().await {
        joined?;
    }

    debug!(workers, outcomes = outcomes.len(), "Dispatch finished");
    Ok(outcomes)
}

/// Feeds an in-memory batch through [`process_records`].
pub async fn process_batch(
    records: Vec<RawRecord>,
    adapter: &'static dyn DrawAdapter,
    workers: usize,
) -> Result<Vec<Outcome>> {
    let (sender, receiver) = mpsc::channel(records.len().max(1));
    for record in records {
        // Capacity covers the whole batch.
        if sender.send(record).await.is_err() {
            break;
        }
    }
    drop(sender);
    process_records(receiver, adapter, workers).await
}
