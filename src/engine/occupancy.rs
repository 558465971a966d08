use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::dates::clamp_to_window;
use crate::model::*;

use super::diagnostics::RunDiagnostics;

/// Night → occupying reservation, for one unit.
pub type UnitCalendar<'a> = BTreeMap<NaiveDate, &'a Reservation>;

/// Reservation id → unit it has been moved to by an accepted move.
pub type Relocations = HashMap<String, String>;

/// Read access to who sleeps where. Implemented by the baseline model and by
/// the sandbox used to try out a single move.
pub trait OccupancyRead {
    fn occupant(&self, unit: &str, night: NaiveDate) -> Option<&Reservation>;

    fn is_occupied(&self, unit: &str, night: NaiveDate) -> bool {
        self.occupant(unit, night).is_some()
    }

    /// True if any night of `stay` is taken in `unit`.
    fn conflicts(&self, unit: &str, stay: &NightSpan) -> bool {
        stay.iter_nights().any(|night| self.is_occupied(unit, night))
    }
}

/// Convert raw rows into reservations, dropping (and recording) bad ones.
pub fn ingest(rows: &[ReservationRow], diag: &mut RunDiagnostics) -> Vec<Reservation> {
    rows.iter()
        .filter_map(|row| match Reservation::try_from_row(row) {
            Ok(r) => Some(r),
            Err(e) => {
                diag.skip_record(e);
                None
            }
        })
        .collect()
}

/// The unit a reservation sits in once accepted moves are applied.
pub fn current_unit<'r>(reservation: &'r Reservation, relocations: &'r Relocations) -> &'r str {
    relocations
        .get(&reservation.id)
        .map(String::as_str)
        .unwrap_or(&reservation.unit)
}

/// Sparse (unit, night) occupancy for one analysis window.
#[derive(Debug, Clone)]
pub struct OccupancyModel<'a> {
    pub window: Window,
    pub dates: Vec<NaiveDate>,
    calendars: HashMap<String, UnitCalendar<'a>>,
    /// Category → unit ids, sorted.
    pub categories: BTreeMap<String, Vec<String>>,
}

impl<'a> OccupancyModel<'a> {
    pub fn build(
        reservations: &'a [Reservation],
        inventory: &[InventoryUnit],
        window: Window,
        relocations: &Relocations,
    ) -> Self {
        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for unit in inventory {
            categories
                .entry(unit.category.clone())
                .or_default()
                .push(unit.unit.clone());
        }
        for units in categories.values_mut() {
            units.sort();
            units.dedup();
        }

        let mut calendars: HashMap<String, UnitCalendar<'a>> = HashMap::new();
        for reservation in reservations {
            let Some(nights) = clamp_to_window(&reservation.stay, &window) else {
                continue;
            };
            let calendar = calendars
                .entry(current_unit(reservation, relocations).to_string())
                .or_default();
            for night in nights.iter_nights() {
                calendar.insert(night, reservation);
            }
        }

        Self {
            window,
            dates: window.dates(),
            calendars,
            categories,
        }
    }

    pub fn units(&self, category: &str) -> &[String] {
        self.categories.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

}

impl OccupancyRead for OccupancyModel<'_> {
    fn occupant(&self, unit: &str, night: NaiveDate) -> Option<&Reservation> {
        self.calendars.get(unit)?.get(&night).copied()
    }
}

/// A single tentative move layered over a model. Nothing is copied; the
/// base is never touched, so dropping the sandbox discards the move.
#[derive(Debug, Clone, Copy)]
pub struct MoveSandbox<'m, 'a> {
    base: &'m OccupancyModel<'a>,
    reservation: &'a Reservation,
    from: &'m str,
    to: &'m str,
}

impl<'m, 'a> MoveSandbox<'m, 'a> {
    pub fn new(base: &'m OccupancyModel<'a>, reservation: &'a Reservation, from: &'m str, to: &'m str) -> Self {
        Self {
            base,
            reservation,
            from,
            to,
        }
    }
}

impl OccupancyRead for MoveSandbox<'_, '_> {
    fn occupant(&self, unit: &str, night: NaiveDate) -> Option<&Reservation> {
        if self.reservation.stay.contains_night(night) {
            if unit == self.to {
                return Some(self.reservation);
            }
            if unit == self.from {
                return match self.base.occupant(unit, night) {
                    Some(r) if r.id == self.reservation.id => None,
                    other => other,
                };
            }
        }
        self.base.occupant(unit, night)
    }
}
