use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::formats::schema::{self, GameSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    EuroMillions,
    Lotto,
    SetForLife,
    Thunderball,
}

impl Game {
    pub const ALL: [Game; 4] = [
        Game::EuroMillions,
        Game::Lotto,
        Game::SetForLife,
        Game::Thunderball,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Game::EuroMillions => "euromillions",
            Game::Lotto => "lotto",
            Game::SetForLife => "set_for_life",
            Game::Thunderball => "thunderball",
        }
    }

    pub fn schema(&self) -> &'static GameSchema {
        match self {
            Game::EuroMillions => &schema::EUROMILLIONS,
            Game::Lotto => &schema::LOTTO,
            Game::SetForLife => &schema::SET_FOR_LIFE,
            Game::Thunderball => &schema::THUNDERBALL,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Game {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "euromillions" | "euro" | "euromillion" => Ok(Game::EuroMillions),
            "lotto" => Ok(Game::Lotto),
            "set_for_life" | "set-for-life" | "setforlife" | "sfl" => Ok(Game::SetForLife),
            "thunderball" | "tball" => Ok(Game::Thunderball),
            other => Err(format!("unknown game '{other}'")),
        }
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Game::try_from(s)
    }
}

/// One decoded draw. Numbers are stored in column order; the day of week is
/// always derived from `draw_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub game: Game,
    pub draw_date: DateTime<Utc>,
    pub balls: Vec<u8>,
    pub secondary: Vec<u8>,
    pub markers: Vec<String>,
    pub draw_no: u64,
}

impl DrawRecord {
    pub fn day_of_week(&self) -> Weekday {
        self.draw_date.weekday()
    }

    pub fn marker(&self, name: &str) -> Option<&str> {
        self.game
            .schema()
            .markers
            .iter()
            .position(|column| column.name == name)
            .and_then(|idx| self.markers.get(idx))
            .map(String::as_str)
    }
}

/// A row as it came off the stream, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub fields: Vec<String>,
    pub line: u64,
    pub error: Option<crate::errors::LineError>,
}

/// Decode result for one raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub line: u64,
    pub result: Result<DrawRecord, crate::errors::RecordError>,
}

impl Outcome {
    pub fn draw(&self) -> Option<&DrawRecord> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&crate::errors::RecordError> {
        self.result.as_ref().err()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: u8,
    pub count: u64,
}
