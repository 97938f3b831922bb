pub mod bet;
pub mod errors;
pub mod formats;
pub mod model;
pub mod reader;
mod registry;

pub use bet::{parse_bet, Bet, BetMatch};
pub use errors::{BetError, DecodeError, DrawError, DrawField, ExtractError, LineError, RecordError};
pub use formats::GameSchema;
pub use model::{DrawRecord, FrequencyEntry, Game, Outcome, RawRecord};
pub use reader::{extract_all, RecordReader};
pub use registry::{adapter_for, decode_record, DrawAdapter};
