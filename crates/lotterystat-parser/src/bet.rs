use std::collections::HashSet;

use serde::Serialize;

use crate::errors::BetError;
use crate::formats::{parse_draw_number, NumberGroup};
use crate::model::{DrawRecord, Game};

/// A player's chosen numbers for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bet {
    pub game: Game,
    pub balls: Vec<u8>,
    pub secondary: Vec<u8>,
}

/// Numbers of a bet that also appear in a draw, in bet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetMatch {
    pub draw_no: u64,
    pub balls: Vec<u8>,
    pub secondary: Vec<u8>,
}

impl BetMatch {
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty() && self.secondary.is_empty()
    }
}

/// Parses a bet written as `b1,b2,...:s1,...`.
///
/// The `:` separator is optional; without it the trailing values after the
/// main numbers are taken as the secondary values.
pub fn parse_bet(game: Game, input: &str) -> Result<Bet, BetError> {
    let schema = game.schema();
    let (main_part, secondary_part) = match input.split_once(':') {
        Some((main, secondary)) => (split_values(main), split_values(secondary)),
        None => {
            let mut values = split_values(input);
            let rest = if values.len() > schema.balls.len() {
                values.split_off(schema.balls.len())
            } else {
                Vec::new()
            };
            (values, rest)
        }
    };

    if main_part.len() != schema.balls.len() {
        return Err(BetError::MainCount {
            game,
            expected: schema.balls.len(),
            found: main_part.len(),
        });
    }
    if secondary_part.len() != schema.secondary.len() {
        return Err(BetError::SecondaryCount {
            game,
            label: schema.secondary.label,
            expected: schema.secondary.len(),
            found: secondary_part.len(),
        });
    }

    Ok(Bet {
        game,
        balls: decode_values(game, &schema.balls, &main_part)?,
        secondary: decode_values(game, &schema.secondary, &secondary_part)?,
    })
}

fn split_values(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect()
}

fn decode_values(game: Game, group: &NumberGroup, values: &[&str]) -> Result<Vec<u8>, BetError> {
    let mut seen = HashSet::with_capacity(values.len());
    let mut decoded = Vec::with_capacity(values.len());
    for value in values {
        let number = parse_draw_number(value, group.max)
            .map_err(|source| BetError::InvalidValue { game, source })?;
        if !seen.insert(number) {
            return Err(BetError::Repeated {
                game,
                value: number,
            });
        }
        decoded.push(number);
    }
    Ok(decoded)
}

impl Bet {
    pub fn match_draw(&self, draw: &DrawRecord) -> BetMatch {
        BetMatch {
            draw_no: draw.draw_no,
            balls: intersect(&self.balls, &draw.balls),
            secondary: intersect(&self.secondary, &draw.secondary),
        }
    }
}

fn intersect(chosen: &[u8], drawn: &[u8]) -> Vec<u8> {
    chosen
        .iter()
        .copied()
        .filter(|value| drawn.contains(value))
        .collect()
}
