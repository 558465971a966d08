use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::dates;
use crate::engine::DefragError;

/// Half-open range of nights `[start, end)`. `end` is the departure date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NightSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NightSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start < end, "NightSpan start must be before end");
        Self { start, end }
    }

    pub fn nights(&self) -> u32 {
        (self.end - self.start).num_days().max(0) as u32
    }

    pub fn overlaps(&self, other: &NightSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of nights shared with `other`.
    pub fn overlap_nights(&self, other: &NightSpan) -> u32 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end { (end - start).num_days() as u32 } else { 0 }
    }

    pub fn contains_night(&self, night: NaiveDate) -> bool {
        self.start <= night && night < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &NightSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn iter_nights(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        dates::nights(self.start, self.end)
    }
}

/// Inclusive analysis window `[start, end]`: both dates are analyzed nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DefragError> {
        if end < start {
            return Err(DefragError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window as a half-open night span.
    pub fn span(&self) -> NightSpan {
        NightSpan::new(self.start, dates::next_day(self.end))
    }

    /// Every analyzed date, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        dates::inclusive(self.start, self.end).collect()
    }

    pub fn len(&self) -> usize {
        self.span().nights() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen both ends by `days`.
    pub fn extend(&self, days: u64) -> Self {
        Self {
            start: self.start - Days::new(days),
            end: self.end + Days::new(days),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus {
    Confirmed,
    Unconfirmed,
    Arrived,
    Departed,
    Maintenance,
    Quote,
    OwnerOccupied,
    Pencil,
}

impl ReservationStatus {
    /// Case-insensitive parse of the status spellings used by the PMS export.
    pub fn parse(raw: &str) -> Option<Self> {
        let status = match raw.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Self::Confirmed,
            "unconfirmed" => Self::Unconfirmed,
            "arrived" => Self::Arrived,
            "departed" => Self::Departed,
            "maintenance" => Self::Maintenance,
            "quote" => Self::Quote,
            "owner" | "owner-occupied" | "owner occupied" => Self::OwnerOccupied,
            "pencil" => Self::Pencil,
            _ => return None,
        };
        Some(status)
    }

    /// Only bookings that have not started and are not held by staff can move.
    pub fn is_moveable(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Unconfirmed)
    }
}

/// A reservation row as delivered by the property-management export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationRow {
    pub id: Option<String>,
    pub surname: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub arrive: Option<String>,
    pub depart: Option<String>,
    pub nights: Option<u32>,
    #[serde(default)]
    pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub guest: String,
    pub unit: String,
    pub category: String,
    pub status: ReservationStatus,
    pub stay: NightSpan,
    pub nights: u32,
    /// Never eligible to move.
    pub fixed: bool,
}

impl Reservation {
    pub fn try_from_row(row: &ReservationRow) -> Result<Self, DefragError> {
        let id = required(row.id.as_deref(), "<unknown>", "id")?;
        let unit = required(row.unit.as_deref(), &id, "unit")?;
        let category = required(row.category.as_deref(), &id, "category")?;
        let raw_status = required(row.status.as_deref(), &id, "status")?;
        let status = ReservationStatus::parse(&raw_status).ok_or_else(|| DefragError::UnknownStatus {
            reservation: id.clone(),
            value: raw_status.clone(),
        })?;
        let arrive = parse_field(row.arrive.as_deref(), &id, "arrive")?;
        let depart = parse_field(row.depart.as_deref(), &id, "depart")?;
        if depart <= arrive {
            return Err(DefragError::InvertedStay { reservation: id });
        }
        let stay = NightSpan::new(arrive, depart);
        if let Some(n) = row.nights
            && n != stay.nights()
        {
            tracing::warn!(
                reservation = %id,
                "night count {n} disagrees with stay dates, using {}",
                stay.nights()
            );
        }
        Ok(Self {
            guest: row.surname.clone().unwrap_or_default(),
            nights: stay.nights(),
            id,
            unit,
            category,
            status,
            stay,
            fixed: row.fixed,
        })
    }

    /// Whole stay lies inside the window.
    pub fn within(&self, window: &Window) -> bool {
        window.span().contains_span(&self.stay)
    }
}

fn required(value: Option<&str>, reservation: &str, field: &'static str) -> Result<String, DefragError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DefragError::MissingField {
            reservation: reservation.to_string(),
            field,
        }),
    }
}

fn parse_field(value: Option<&str>, reservation: &str, field: &'static str) -> Result<NaiveDate, DefragError> {
    let raw = required(value, reservation, field)?;
    dates::parse_stay_date(&raw).ok_or_else(|| DefragError::InvalidDate {
        reservation: reservation.to_string(),
        field,
        value: raw,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryUnit {
    pub unit: String,
    pub category: String,
}

/// A maximal free period of one unit: `[start, end)` of `nights` nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRun {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub nights: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImportanceTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayPeriod {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub importance: ImportanceTier,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub extended_start: NaiveDate,
    pub extended_end: NaiveDate,
    /// Two-region key, e.g. `"VIC/NSW"`.
    pub region: String,
}

/// Holiday context attached to a move found inside a holiday's extended window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayTag {
    pub holiday_name: String,
    pub holiday_type: String,
    pub importance_tier: ImportanceTier,
    pub holiday_start: NaiveDate,
    pub holiday_end: NaiveDate,
    pub extended_start: NaiveDate,
    pub extended_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSuggestion {
    pub property: String,
    pub reservation_id: String,
    pub guest_name: String,
    pub source_unit: String,
    pub target_unit: String,
    pub category: String,
    pub status: ReservationStatus,
    pub arrive_date: NaiveDate,
    pub depart_date: NaiveDate,
    pub nights: u32,
    #[serde(serialize_with = "two_decimals")]
    pub improvement_score: f64,
    pub nights_freed: u32,
    pub reason_text: String,
    pub sequential_order: String,
    pub is_holiday_move: bool,
    #[serde(flatten)]
    pub holiday: Option<HolidayTag>,
}

impl MoveSuggestion {
    pub fn stay(&self) -> NightSpan {
        NightSpan::new(self.arrive_date, self.depart_date)
    }

    pub fn tier(&self) -> Option<ImportanceTier> {
        self.holiday.as_ref().map(|h| h.importance_tier)
    }
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}
