use crate::errors::{DrawError, DrawField};
use crate::model::{DrawRecord, Game};

use super::schema::{GameSchema, NumberGroup};
use super::{parse_draw_date, parse_draw_number, parse_draw_seq};

/// Decodes one row of a game's CSV export.
///
/// Fields are decoded in a fixed order: date, main balls, secondary values,
/// markers, draw number. The first failure wins.
pub fn decode_draw<S: AsRef<str>>(
    schema: &GameSchema,
    fields: &[S],
) -> Result<DrawRecord, DrawError> {
    let game = schema.game;
    if fields.len() != schema.column_count {
        return Err(DrawError::ColumnCount {
            game,
            expected: schema.column_count,
            found: fields.len(),
        });
    }

    let draw_date =
        parse_draw_date(fields[schema.date_column].as_ref()).map_err(|source| {
            DrawError::InvalidField {
                game,
                field: DrawField::DrawDate,
                source,
            }
        })?;

    let balls = decode_group(game, &schema.balls, fields, DrawField::Ball)?;
    let secondary = decode_group(game, &schema.secondary, fields, |position| {
        DrawField::Secondary(schema.secondary.label, position)
    })?;

    let markers = schema
        .markers
        .iter()
        .map(|marker| fields[marker.index].as_ref().to_string())
        .collect();

    let draw_no =
        parse_draw_seq(fields[schema.draw_no_column].as_ref()).map_err(|source| {
            DrawError::InvalidField {
                game,
                field: DrawField::DrawNo,
                source,
            }
        })?;

    Ok(DrawRecord {
        game,
        draw_date,
        balls,
        secondary,
        markers,
        draw_no,
    })
}

fn decode_group<S: AsRef<str>>(
    game: Game,
    group: &NumberGroup,
    fields: &[S],
    field_for: impl Fn(usize) -> DrawField,
) -> Result<Vec<u8>, DrawError> {
    group
        .columns()
        .enumerate()
        .map(|(offset, column)| {
            parse_draw_number(fields[column].as_ref(), group.max).map_err(|source| {
                DrawError::InvalidField {
                    game,
                    field: field_for(offset + 1),
                    source,
                }
            })
        })
        .collect()
}
