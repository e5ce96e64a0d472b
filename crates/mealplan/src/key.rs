use std::{fmt, str::FromStr};

use time::{Date, macros::format_description};

pub const SEPARATOR: char = '_';

const DATE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("slot name is empty")]
    EmptySlot,

    #[error("slot name must not start or end with whitespace")]
    UntrimmedSlot,

    #[error("slot name must not contain control characters")]
    ControlCharacter,

    #[error("year {0} cannot be encoded with 4 digits")]
    YearOutOfRange(i32),

    #[error("expected a YYYY-MM-DD date prefix")]
    MalformedDate,

    #[error("expected '_' after the date")]
    MissingSeparator,

    #[error("{0}")]
    InvalidDate(String),
}

/// Checks a slot name can be embedded in an assignment key.
///
/// The date prefix has a fixed width, so the separator itself is allowed
/// inside slot names.
pub fn validate_slot(slot: &str) -> Result<(), KeyError> {
    if slot.is_empty() {
        return Err(KeyError::EmptySlot);
    }

    if slot.trim() != slot {
        return Err(KeyError::UntrimmedSlot);
    }

    if slot.chars().any(char::is_control) {
        return Err(KeyError::ControlCharacter);
    }

    Ok(())
}

pub fn format_date(date: Date) -> Result<String, KeyError> {
    if !(0..=9999).contains(&date.year()) {
        return Err(KeyError::YearOutOfRange(date.year()));
    }

    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| KeyError::InvalidDate(e.to_string()))
}

/// Parses a strict `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<Date, KeyError> {
    if value.len() != DATE_LEN {
        return Err(KeyError::MalformedDate);
    }

    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| KeyError::InvalidDate(e.to_string()))
}

pub fn encode(date: Date, slot: &str) -> Result<String, KeyError> {
    Ok(AssignmentKey::new(date, slot)?.to_string())
}

pub fn decode(key: &str) -> Result<(Date, String), KeyError> {
    let AssignmentKey { date, slot } = key.parse()?;

    Ok((date, slot))
}

/// A decoded (date, slot) cell of a meal plan grid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignmentKey {
    pub date: Date,
    pub slot: String,
}

impl AssignmentKey {
    pub fn new(date: Date, slot: impl Into<String>) -> Result<Self, KeyError> {
        let slot = slot.into();
        validate_slot(&slot)?;
        format_date(date)?;

        Ok(Self { date, slot })
    }
}

impl fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = format_date(self.date).map_err(|_| fmt::Error)?;

        write!(f, "{date}{SEPARATOR}{}", self.slot)
    }
}

impl FromStr for AssignmentKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(prefix) = s.get(..DATE_LEN) else {
            return Err(KeyError::MalformedDate);
        };

        let date = parse_date(prefix)?;

        let Some(slot) = s[DATE_LEN..].strip_prefix(SEPARATOR) else {
            return Err(KeyError::MissingSeparator);
        };

        validate_slot(slot)?;

        Ok(Self {
            date,
            slot: slot.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_encode() {
        assert_eq!(
            encode(date!(2024 - 03 - 05), "breakfast").unwrap(),
            "2024-03-05_breakfast"
        );
        assert_eq!(
            encode(date!(0987 - 11 - 30), "late snack").unwrap(),
            "0987-11-30_late snack"
        );
    }

    #[test]
    fn test_round_trip() {
        let dates = [
            date!(2024 - 02 - 29),
            date!(2023 - 12 - 31),
            date!(2025 - 01 - 01),
            date!(0001 - 06 - 15),
        ];
        let slots = ["breakfast", "lunch", "dinner", "kids_dinner", "2024-01-01_x", "goûter"];

        for date in dates {
            for slot in slots {
                let key = encode(date, slot).unwrap();
                assert_eq!(decode(&key).unwrap(), (date, slot.to_owned()));

                let parsed: AssignmentKey = key.parse().unwrap();
                assert_eq!(parsed.to_string(), key);
            }
        }
    }

    #[test]
    fn test_encode_rejects_bad_slots() {
        let date = date!(2024 - 03 - 15);

        assert_eq!(encode(date, ""), Err(KeyError::EmptySlot));
        assert_eq!(encode(date, " lunch"), Err(KeyError::UntrimmedSlot));
        assert_eq!(encode(date, "lun\nch"), Err(KeyError::ControlCharacter));
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(decode("breakfast"), Err(KeyError::MalformedDate));
        assert!(matches!(
            decode("2024/03/15_lunch"),
            Err(KeyError::InvalidDate(_))
        ));
        assert!(matches!(
            decode("24-03-15_lunch"),
            Err(KeyError::InvalidDate(_))
        ));
        assert_eq!(decode("2024-03-15lunch"), Err(KeyError::MissingSeparator));
        assert_eq!(decode("2024-03-15"), Err(KeyError::MissingSeparator));
        assert_eq!(decode("2024-03-15_"), Err(KeyError::EmptySlot));
        assert!(matches!(
            decode("2023-02-29_lunch"),
            Err(KeyError::InvalidDate(_))
        ));
        assert!(matches!(
            decode("2024-13-01_lunch"),
            Err(KeyError::InvalidDate(_))
        ));
        assert!(matches!(
            decode("é024-03-15_lunch"),
            Err(KeyError::InvalidDate(_))
        ));
        assert_eq!(decode("2024-03-1é_lunch"), Err(KeyError::MalformedDate));
    }

    #[test]
    fn test_dates_use_fixed_width() {
        assert_eq!(format_date(date!(0042 - 01 - 09)).unwrap(), "0042-01-09");
        assert_eq!(parse_date("0042-01-09").unwrap(), date!(0042 - 01 - 09));
        assert_eq!(parse_date("2024-3-15"), Err(KeyError::MalformedDate));
        assert!(matches!(
            parse_date("2024-03-1x"),
            Err(KeyError::InvalidDate(_))
        ));

        let before_year_zero = Date::from_calendar_date(-1, time::Month::December, 31).unwrap();
        assert_eq!(
            format_date(before_year_zero),
            Err(KeyError::YearOutOfRange(-1))
        );
    }

    #[test]
    fn test_assignment_key_checks_parts() {
        let key = AssignmentKey::new(date!(2024 - 03 - 15), "lunch").unwrap();
        assert_eq!(key.to_string(), "2024-03-15_lunch");

        assert_eq!(
            AssignmentKey::new(date!(2024 - 03 - 15), "lunch "),
            Err(KeyError::UntrimmedSlot)
        );
    }
}
