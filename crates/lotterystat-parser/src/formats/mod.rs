mod common;
mod draw;
pub mod schema;

pub use common::{parse_draw_date, parse_draw_number, parse_draw_seq};
pub use draw::decode_draw;
pub use schema::{GameSchema, MarkerColumn, NumberGroup};
