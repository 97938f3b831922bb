use crate::model::Game;

/// A run of numeric columns sharing one range.
#[derive(Debug, Clone, Copy)]
pub struct NumberGroup {
    pub label: &'static str,
    pub first_column: usize,
    pub names: &'static [&'static str],
    pub max: u8,
}

impl NumberGroup {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn columns(&self) -> std::ops::Range<usize> {
        self.first_column..self.first_column + self.names.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MarkerColumn {
    pub index: usize,
    pub name: &'static str,
}

/// Column layout and value ranges of one game's CSV export. Column names
/// double as the SQL column names of the game's table.
#[derive(Debug, Clone, Copy)]
pub struct GameSchema {
    pub game: Game,
    pub table: &'static str,
    pub column_count: usize,
    pub date_column: usize,
    pub balls: NumberGroup,
    pub secondary: NumberGroup,
    pub markers: &'static [MarkerColumn],
    pub draw_no_column: usize,
}

pub const DRAW_DATE_COLUMN: &str = "draw_date";
pub const DAY_OF_WEEK_COLUMN: &str = "day_of_week";
pub const DRAW_NO_COLUMN: &str = "draw_no";

pub static EUROMILLIONS: GameSchema = GameSchema {
    game: Game::EuroMillions,
    table: "euro",
    column_count: 11,
    date_column: 0,
    balls: NumberGroup {
        label: "ball",
        first_column: 1,
        names: &["ball1", "ball2", "ball3", "ball4", "ball5"],
        max: 50,
    },
    secondary: NumberGroup {
        label: "lucky star",
        first_column: 6,
        names: &["ls1", "ls2"],
        max: 12,
    },
    markers: &[
        MarkerColumn {
            index: 8,
            name: "uk_marker",
        },
        MarkerColumn {
            index: 9,
            name: "euro_marker",
        },
    ],
    draw_no_column: 10,
};

pub static LOTTO: GameSchema = GameSchema {
    game: Game::Lotto,
    table: "lotto",
    column_count: 11,
    date_column: 0,
    balls: NumberGroup {
        label: "ball",
        first_column: 1,
        names: &["ball1", "ball2", "ball3", "ball4", "ball5", "ball6"],
        max: 59,
    },
    secondary: NumberGroup {
        label: "bonus ball",
        first_column: 7,
        names: &["bonus_ball"],
        max: 59,
    },
    markers: &[
        MarkerColumn {
            index: 8,
            name: "ball_set",
        },
        MarkerColumn {
            index: 9,
            name: "machine",
        },
    ],
    draw_no_column: 10,
};

pub static SET_FOR_LIFE: GameSchema = GameSchema {
    game: Game::SetForLife,
    table: "sflife",
    column_count: 10,
    date_column: 0,
    balls: NumberGroup {
        label: "ball",
        first_column: 1,
        names: &["ball1", "ball2", "ball3", "ball4", "ball5"],
        max: 47,
    },
    secondary: NumberGroup {
        label: "life ball",
        first_column: 6,
        names: &["life_ball"],
        max: 10,
    },
    markers: &[
        MarkerColumn {
            index: 7,
            name: "ball_set",
        },
        MarkerColumn {
            index: 8,
            name: "machine",
        },
    ],
    draw_no_column: 9,
};

pub static THUNDERBALL: GameSchema = GameSchema {
    game: Game::Thunderball,
    table: "tball",
    column_count: 10,
    date_column: 0,
    balls: NumberGroup {
        label: "ball",
        first_column: 1,
        names: &["ball1", "ball2", "ball3", "ball4", "ball5"],
        max: 39,
    },
    secondary: NumberGroup {
        label: "thunderball",
        first_column: 6,
        names: &["tball"],
        max: 14,
    },
    markers: &[
        MarkerColumn {
            index: 7,
            name: "ball_set",
        },
        MarkerColumn {
            index: 8,
            name: "machine",
        },
    ],
    draw_no_column: 9,
};
