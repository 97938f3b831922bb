use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::DecodeError;

const MONTHS: [(&str, &str, i64); 12] = [
    ("Jan", "January", 31),
    ("Feb", "February", 28),
    ("Mar", "March", 31),
    ("Apr", "April", 30),
    ("May", "May", 31),
    ("Jun", "June", 30),
    ("Jul", "July", 31),
    ("Aug", "August", 31),
    ("Sep", "September", 30),
    ("Oct", "October", 31),
    ("Nov", "November", 30),
    ("Dec", "December", 31),
];

/// Decodes a `D-Mon-YYYY` draw date into UTC midnight.
///
/// February accepts a 29th whenever `year % 4 == 0`. Century years such as
/// 2100 therefore pass validation; the date is then rolled over to 1 March,
/// matching how the exported history has always been interpreted.
pub fn parse_draw_date(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    let parts: Vec<&str> = value.split('-').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(DecodeError::InvalidDateFormat {
            value: value.to_string(),
        });
    };

    let day: i64 = day.parse().map_err(|_| DecodeError::InvalidDayFormat {
        value: (*day).to_string(),
    })?;
    let year: i32 = year.parse().map_err(|_| DecodeError::InvalidYearFormat {
        value: (*year).to_string(),
    })?;

    let Some((month_idx, (_, month_name, days))) = MONTHS
        .iter()
        .enumerate()
        .find(|(_, (abbrev, _, _))| abbrev == month)
    else {
        return Err(DecodeError::InvalidMonth {
            value: (*month).to_string(),
        });
    };

    let max_day = if month_idx == 1 && year % 4 == 0 {
        29
    } else {
        *days
    };
    if !(1..=max_day).contains(&day) {
        return Err(DecodeError::InvalidDaysInMonth {
            day,
            month: *month_name,
            year,
        });
    }

    let month = month_idx as u32 + 1;
    let date = NaiveDate::from_ymd_opt(year, month, day as u32)
        .or_else(|| {
            if month == 2 && day == 29 {
                NaiveDate::from_ymd_opt(year, 3, 1)
            } else {
                None
            }
        })
        .ok_or_else(|| DecodeError::InvalidYearFormat {
            value: year.to_string(),
        })?;

    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| DecodeError::InvalidYearFormat {
            value: year.to_string(),
        })
}

/// Decodes a drawn number that must lie in `[1, max]`.
pub fn parse_draw_number(value: &str, max: u8) -> Result<u8, DecodeError> {
    let parsed: i64 = value.parse().map_err(|_| DecodeError::InvalidDrawDigit {
        value: value.to_string(),
    })?;
    if parsed < 1 || parsed > i64::from(max) {
        return Err(DecodeError::InvalidDrawRange { value: parsed, max });
    }
    Ok(parsed as u8)
}

/// Decodes the operator's draw sequence number. No upper bound.
pub fn parse_draw_seq(value: &str) -> Result<u64, DecodeError> {
    value.parse::<u64>().map_err(|_| DecodeError::InvalidDrawSeq {
        value: value.to_string(),
    })
}
