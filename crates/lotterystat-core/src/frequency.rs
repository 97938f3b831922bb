use futures::stream::{self, StreamExt, TryStreamExt};
use lotterystat_parser::formats::NumberGroup;
use lotterystat_parser::{FrequencyEntry, Game};
use serde::Serialize;
use tracing::debug;

use crate::db::DbPool;
use crate::error::{PipelineError, Result};

/// `SELECT` summing, over every row, how many of the group's columns equal
/// `?1`. Repeated values within one row each count.
fn count_sql(table: &str, group: &NumberGroup) -> String {
    let terms: Vec<String> = group
        .names
        .iter()
        .map(|column| format!("({column} = ?1)"))
        .collect();
    format!(
        "SELECT COALESCE(SUM({}), 0) FROM {table}",
        terms.join(" + ")
    )
}

fn pair_sql(table: &str, group: &NumberGroup) -> String {
    let columns = group.names.join(", ");
    format!("SELECT COUNT(*) FROM {table} WHERE ?1 IN ({columns}) AND ?2 IN ({columns})")
}

async fn group_frequency(
    pool: &DbPool,
    table: &'static str,
    group: &NumberGroup,
) -> Result<Vec<FrequencyEntry>> {
    let sql = count_sql(table, group);
    let mut entries = Vec::with_capacity(usize::from(group.max));

    for value in 1..=group.max {
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(i64::from(value))
            .fetch_one(pool)
            .await
            .map_err(|source| PipelineError::Query { table, source })?;
        entries.push(FrequencyEntry {
            value,
            count: count.max(0) as u64,
        });
    }

    debug!(table, label = group.label, values = entries.len(), "Frequency computed");
    Ok(entries)
}

/// Dense count of every main-ball value `1..=max`, ascending.
pub async fn ball_frequency(pool: &DbPool, game: Game) -> Result<Vec<FrequencyEntry>> {
    let schema = game.schema();
    group_frequency(pool, schema.table, &schema.balls).await
}

/// Dense count of every secondary value `1..=max`, ascending.
pub async fn secondary_frequency(pool: &DbPool, game: Game) -> Result<Vec<FrequencyEntry>> {
    let schema = game.schema();
    group_frequency(pool, schema.table, &schema.secondary).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairCount {
    pub pair: [u8; 2],
    pub count: u64,
}

/// Number of draws containing both values of every unordered main-ball pair,
/// most frequent first. Ties are ordered by pair.
pub async fn pair_frequency(pool: &DbPool, game: Game, workers: usize) -> Result<Vec<PairCount>> {
    let schema = game.schema();
    let table = schema.table;
    let sql = pair_sql(table, &schema.balls);
    let max = schema.balls.max;

    let pairs: Vec<[u8; 2]> = (1..=max)
        .flat_map(|first| (first + 1..=max).map(move |second| [first, second]))
        .collect();
    let total = pairs.len();

    let mut counts: Vec<PairCount> = stream::iter(pairs)
        .map(|pair| {
            let sql = sql.as_str();
            async move {
                let count: i64 = sqlx::query_scalar(sql)
                    .bind(i64::from(pair[0]))
                    .bind(i64::from(pair[1]))
                    .fetch_one(pool)
                    .await
                    .map_err(|source| PipelineError::Query { table, source })?;
                Ok::<_, PipelineError>(PairCount {
                    pair,
                    count: count.max(0) as u64,
                })
            }
        })
        .buffer_unordered(workers.max(1))
        .try_collect()
        .await?;

    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.pair.cmp(&b.pair)));
    debug!(game = %game, pairs = total, "Pair frequency computed");
    Ok(counts)
}
