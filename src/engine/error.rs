use chrono::NaiveDate;

/// Problems found in input data. None of these abort an analysis: the
/// offending record or category is skipped and the error is kept in the
/// run diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefragError {
    InvalidDate {
        reservation: String,
        field: &'static str,
        value: String,
    },
    MissingField {
        reservation: String,
        field: &'static str,
    },
    UnknownStatus {
        reservation: String,
        value: String,
    },
    InvertedStay {
        reservation: String,
    },
    EmptyInventory,
    UnknownCategory {
        category: String,
    },
    InvalidWindow {
        start: NaiveDate,
        end: NaiveDate,
    },
    InvalidHoliday {
        holiday: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl std::fmt::Display for DefragError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefragError::InvalidDate {
                reservation,
                field,
                value,
            } => write!(f, "reservation {reservation}: unparsable {field} date {value:?}"),
            DefragError::MissingField { reservation, field } => {
                write!(f, "reservation {reservation}: missing {field}")
            }
            DefragError::UnknownStatus { reservation, value } => {
                write!(f, "reservation {reservation}: unknown status {value:?}")
            }
            DefragError::InvertedStay { reservation } => {
                write!(f, "reservation {reservation}: departure is not after arrival")
            }
            DefragError::EmptyInventory => write!(f, "no inventory units"),
            DefragError::UnknownCategory { category } => {
                write!(f, "category {category} has reservations but no units")
            }
            DefragError::InvalidWindow { start, end } => {
                write!(f, "analysis window [{start}, {end}] ends before it starts")
            }
            DefragError::InvalidHoliday { holiday, start, end } => {
                write!(f, "holiday {holiday}: [{start}, {end}] ends before it starts")
            }
        }
    }
}

impl std::error::Error for DefragError {}
