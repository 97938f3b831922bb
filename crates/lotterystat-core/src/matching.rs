use lotterystat_parser::{Bet, BetMatch, DrawRecord};
use serde::Serialize;
use tracing::debug;

use crate::db::DbPool;
use crate::error::{PipelineError, Result};
use crate::persistence::{draw_from_row, select_sql};

/// One draw that shares at least one main ball with a bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetReport {
    pub bet: Bet,
    pub draw: DrawRecord,
    pub matched: BetMatch,
}

/// Pairs every bet with every draw of the same game holding at least one of
/// its main balls. Reports follow bet order, then draw order.
pub fn match_bets(draws: &[DrawRecord], bets: &[Bet]) -> Vec<BetReport> {
    bets.iter()
        .flat_map(move |bet| {
            draws
                .iter()
                .filter(move |draw| draw.game == bet.game)
                .filter_map(move |draw| {
                    let matched = bet.match_draw(draw);
                    (!matched.balls.is_empty()).then(|| BetReport {
                        bet: bet.clone(),
                        draw: draw.clone(),
                        matched,
                    })
                })
        })
        .collect()
}

/// Stored draws holding at least one of the bet's main balls, ordered by draw
/// number.
pub async fn matching_draws(pool: &DbPool, bet: &Bet) -> Result<Vec<DrawRecord>> {
    let schema = bet.game.schema();
    let placeholders: Vec<String> = (1..=bet.balls.len()).map(|idx| format!("?{idx}")).collect();
    let placeholders = placeholders.join(", ");
    let conditions: Vec<String> = schema
        .balls
        .names
        .iter()
        .map(|column| format!("{column} IN ({placeholders})"))
        .collect();
    let sql = format!(
        "{} WHERE {} ORDER BY draw_no",
        select_sql(schema),
        conditions.join(" OR ")
    );

    let mut query = sqlx::query(&sql);
    for value in &bet.balls {
        query = query.bind(i64::from(*value));
    }
    let rows = query
        .fetch_all(pool)
        .await
        .map_err(|source| PipelineError::Query {
            table: schema.table,
            source,
        })?;

    let draws = rows
        .iter()
        .map(|row| draw_from_row(schema, row))
        .collect::<Result<Vec<_>>>()?;
    debug!(game = %bet.game, draws = draws.len(), "Matching draws loaded");
    Ok(draws)
}

/// Checks one bet against the stored history of its game.
pub async fn check_bet(pool: &DbPool, bet: &Bet) -> Result<Vec<BetReport>> {
    let draws = matching_draws(pool, bet).await?;
    Ok(match_bets(&draws, std::slice::from_ref(bet)))
}
