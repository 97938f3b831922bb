use chrono::{DateTime, Datelike};
use lotterystat_parser::formats::schema::{DAY_OF_WEEK_COLUMN, DRAW_DATE_COLUMN, DRAW_NO_COLUMN};
use lotterystat_parser::{DrawRecord, Game, GameSchema};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};

use crate::db::DbPool;
use crate::error::{PipelineError, Result};

/// Every SQL column of a game's table, in insert order.
pub(crate) fn table_columns(schema: &GameSchema) -> Vec<&'static str> {
    let mut columns = vec![DRAW_DATE_COLUMN, DAY_OF_WEEK_COLUMN];
    columns.extend(schema.balls.names.iter().copied());
    columns.extend(schema.secondary.names.iter().copied());
    columns.extend(schema.markers.iter().map(|marker| marker.name));
    columns.push(DRAW_NO_COLUMN);
    columns
}

fn create_table_sql(schema: &GameSchema) -> String {
    let mut definitions = vec![
        format!("{DRAW_DATE_COLUMN} INTEGER NOT NULL"),
        format!("{DAY_OF_WEEK_COLUMN} INTEGER NOT NULL"),
    ];
    for name in schema.balls.names.iter().chain(schema.secondary.names) {
        definitions.push(format!("{name} INTEGER NOT NULL"));
    }
    for marker in schema.markers {
        definitions.push(format!("{} TEXT NOT NULL", marker.name));
    }
    definitions.push(format!("{DRAW_NO_COLUMN} INTEGER PRIMARY KEY"));

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        schema.table,
        definitions.join(", ")
    )
}

fn insert_sql(schema: &GameSchema) -> String {
    let columns = table_columns(schema);
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.table,
        columns.join(", "),
        placeholders
    )
}

pub(crate) fn select_sql(schema: &GameSchema) -> String {
    format!(
        "SELECT {} FROM {}",
        table_columns(schema).join(", "),
        schema.table
    )
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

pub async fn create_table(pool: &DbPool, game: Game) -> Result<()> {
    let schema = game.schema();
    sqlx::query(&create_table_sql(schema))
        .execute(pool)
        .await
        .map_err(|source| PipelineError::CreateTable {
            table: schema.table,
            source,
        })?;
    debug!(table = schema.table, "Ensured draw table exists");
    Ok(())
}

/// Creates the table of every supported game.
pub async fn initialize(pool: &DbPool) -> Result<()> {
    for game in Game::ALL {
        create_table(pool, game).await?;
    }
    info!(games = Game::ALL.len(), "Database initialized");
    Ok(())
}

/// Inserts one draw. A draw number already present yields
/// [`PipelineError::DuplicateEntry`] and leaves the stored row untouched.
pub async fn persist_draw(pool: &DbPool, draw: &DrawRecord) -> Result<()> {
    let schema = draw.game.schema();
    if draw.balls.len() != schema.balls.len()
        || draw.secondary.len() != schema.secondary.len()
        || draw.markers.len() != schema.markers.len()
    {
        return Err(PipelineError::Processing(format!(
            "draw {} does not match the {} layout",
            draw.draw_no, draw.game
        )));
    }
    let draw_no = i64::try_from(draw.draw_no).map_err(|_| {
        PipelineError::Processing(format!("draw number {} exceeds SQLite range", draw.draw_no))
    })?;

    let sql = insert_sql(schema);
    let mut query = sqlx::query(&sql)
        .bind(draw.draw_date.timestamp())
        .bind(i64::from(draw.draw_date.weekday().num_days_from_sunday()));
    for value in draw.balls.iter().chain(&draw.secondary) {
        query = query.bind(i64::from(*value));
    }
    for marker in &draw.markers {
        query = query.bind(marker.as_str());
    }
    query = query.bind(draw_no);

    match query.execute(pool).await {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Err(PipelineError::DuplicateEntry {
            table: schema.table,
            draw_no: draw.draw_no,
        }),
        Err(source) => Err(PipelineError::Insert {
            table: schema.table,
            draw_no: draw.draw_no,
            source,
        }),
    }
}

/// Every stored draw of a game, ordered by draw number.
pub async fn list_all_draws(pool: &DbPool, game: Game) -> Result<Vec<DrawRecord>> {
    let schema = game.schema();
    let sql = format!("{} ORDER BY {DRAW_NO_COLUMN}", select_sql(schema));
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .map_err(|source| PipelineError::Query {
            table: schema.table,
            source,
        })?;

    rows.iter().map(|row| draw_from_row(schema, row)).collect()
}

pub async fn count_draws(pool: &DbPool, game: Game) -> Result<u64> {
    let schema = game.schema();
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", schema.table))
        .fetch_one(pool)
        .await
        .map_err(|source| PipelineError::Query {
            table: schema.table,
            source,
        })?;
    Ok(count.max(0) as u64)
}

pub(crate) fn draw_from_row(schema: &GameSchema, row: &SqliteRow) -> Result<DrawRecord> {
    let query_err = |source: sqlx::Error| PipelineError::Query {
        table: schema.table,
        source,
    };

    let timestamp: i64 = row.try_get(DRAW_DATE_COLUMN).map_err(query_err)?;
    let draw_date = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        PipelineError::Processing(format!(
            "{} holds an invalid timestamp {timestamp}",
            schema.table
        ))
    })?;

    let number = |name: &str| -> Result<u8> {
        let value: i64 = row.try_get(name).map_err(query_err)?;
        u8::try_from(value).map_err(|_| {
            PipelineError::Processing(format!("{} column {name} holds {value}", schema.table))
        })
    };
    let balls = schema
        .balls
        .names
        .iter()
        .map(|name| number(*name))
        .collect::<Result<Vec<_>>>()?;
    let secondary = schema
        .secondary
        .names
        .iter()
        .map(|name| number(*name))
        .collect::<Result<Vec<_>>>()?;

    let markers = schema
        .markers
        .iter()
        .map(|marker| row.try_get::<String, _>(marker.name).map_err(query_err))
        .collect::<Result<Vec<_>>>()?;

    let draw_no: i64 = row.try_get(DRAW_NO_COLUMN).map_err(query_err)?;
    let draw_no = u64::try_from(draw_no).map_err(|_| {
        PipelineError::Processing(format!("{} holds negative draw number {draw_no}", schema.table))
    })?;

    Ok(DrawRecord {
        game: schema.game,
        draw_date,
        balls,
        secondary,
        markers,
        draw_no,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplicationReport {
    pub copied: usize,
    pub duplicates: usize,
}

/// Copies every draw of `game` from `source` into `target`. Draws the target
/// already holds are counted and skipped.
pub async fn replicate_draws(
    source: &DbPool,
    target: &DbPool,
    game: Game,
) -> Result<ReplicationReport> {
    create_table(target, game).await?;
    let draws = list_all_draws(source, game).await?;

    let mut report = ReplicationReport::default();
    for draw in &draws {
        match persist_draw(target, draw).await {
            Ok(()) => report.copied += 1,
            Err(err) if err.is_duplicate() => report.duplicates += 1,
            Err(err) => return Err(err),
        }
    }

    info!(
        game = %game,
        copied = report.copied,
        duplicates = report.duplicates,
        "Replication finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lotto_statements_follow_column_layout() {
        let schema = Game::Lotto.schema();
        assert_eq!(
            insert_sql(schema),
            "INSERT INTO lotto (draw_date, day_of_week, ball1, ball2, ball3, ball4, ball5, ball6, \
             bonus_ball, ball_set, machine, draw_no) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        assert!(create_table_sql(schema).starts_with("CREATE TABLE IF NOT EXISTS lotto ("));
        assert!(create_table_sql(schema).ends_with("draw_no INTEGER PRIMARY KEY)"));
    }

    #[test]
    fn every_table_has_one_column_per_csv_field_plus_weekday() {
        for game in Game::ALL {
            let schema = game.schema();
            assert_eq!(table_columns(schema).len(), schema.column_count + 1, "{game}");
        }
    }
}
