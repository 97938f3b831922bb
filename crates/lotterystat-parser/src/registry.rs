use crate::errors::{DrawError, RecordError};
use crate::formats::{decode_draw, GameSchema};
use crate::model::{DrawRecord, Game, Outcome, RawRecord};

/// Turns the fields of one row into a draw for a single game.
pub trait DrawAdapter: Send + Sync {
    fn game(&self) -> Game;
    fn decode(&self, fields: &[String]) -> Result<DrawRecord, DrawError>;
}

impl DrawAdapter for GameSchema {
    fn game(&self) -> Game {
        self.game
    }

    fn decode(&self, fields: &[String]) -> Result<DrawRecord, DrawError> {
        decode_draw(self, fields)
    }
}

pub fn adapter_for(game: Game) -> &'static dyn DrawAdapter {
    game.schema()
}

/// Decodes a raw record into exactly one outcome. Records already tagged by
/// the extractor never reach the adapter.
pub fn decode_record(adapter: &dyn DrawAdapter, raw: RawRecord) -> Outcome {
    let RawRecord {
        fields,
        line,
        error,
    } = raw;

    let result = match error {
        Some(line_error) => Err(RecordError::Line(line_error)),
        None => adapter.decode(&fields).map_err(RecordError::Draw),
    };

    Outcome { line, result }
}
