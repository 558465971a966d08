use chrono::{Days, NaiveDate};
use tracing::info;

use crate::engine::{Engine, RunDiagnostics};
use crate::model::*;

impl HolidayPeriod {
    /// Build a period whose extended bounds are `extension_days` either side of
    /// the canonical `[start, end]`.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        importance: ImportanceTier,
        start: NaiveDate,
        end: NaiveDate,
        region: impl Into<String>,
        extension_days: u64,
    ) -> Self {
        let extended = Window { start, end }.extend(extension_days);
        Self {
            name: name.into(),
            kind: kind.into(),
            importance,
            start,
            end,
            extended_start: extended.start,
            extended_end: extended.end,
            region: region.into(),
        }
    }

    pub fn extended_window(&self) -> Window {
        Window {
            start: self.extended_start.min(self.start),
            end: self.extended_end.max(self.end),
        }
    }

    /// Either half of the two-region key matches, or the holiday is national.
    pub fn applies_to(&self, region: &str) -> bool {
        let region = region.trim();
        self.region.eq_ignore_ascii_case("national")
            || self
                .region
                .split(['/', ',', '|'])
                .any(|r| r.trim().eq_ignore_ascii_case(region))
    }

    pub fn tag(&self) -> HolidayTag {
        HolidayTag {
            holiday_name: self.name.clone(),
            holiday_type: self.kind.clone(),
            importance_tier: self.importance,
            holiday_start: self.start,
            holiday_end: self.end,
            extended_start: self.extended_start,
            extended_end: self.extended_end,
        }
    }
}

/// Holidays starting within `horizon_days` of `base`, inclusive, in input order.
pub fn upcoming(holidays: &[HolidayPeriod], base: NaiveDate, horizon_days: u64) -> Vec<&HolidayPeriod> {
    let horizon = base + Days::new(horizon_days);
    holidays
        .iter()
        .filter(|h| base <= h.start && h.start <= horizon)
        .collect()
}

/// Reservations with at least one night inside `window`.
pub fn touching(reservations: &[Reservation], window: &Window) -> Vec<Reservation> {
    let span = window.span();
    reservations
        .iter()
        .filter(|r| r.stay.overlaps(&span))
        .cloned()
        .collect()
}

/// Run the engine over one holiday's extended window and tag the results.
pub fn analyze_holiday(
    engine: &Engine,
    property: &str,
    reservations: &[Reservation],
    inventory: &[InventoryUnit],
    holiday: &HolidayPeriod,
    diag: &mut RunDiagnostics,
) -> Vec<MoveSuggestion> {
    let window = holiday.extended_window();
    let subset = touching(reservations, &window);
    info!(
        holiday = %holiday.name,
        start = %window.start,
        end = %window.end,
        reservations = subset.len(),
        "holiday window"
    );

    let tag = holiday.tag();
    engine
        .analyze_with(property, &subset, inventory, window, diag)
        .into_iter()
        .map(|mut m| {
            m.is_holiday_move = true;
            m.holiday = Some(tag.clone());
            m
        })
        .collect()
}

/// Holiday moves for every upcoming holiday that applies to `region`
/// (all holidays when `region` is None).
#[allow(clippy::too_many_arguments)]
pub fn analyze_upcoming(
    engine: &Engine,
    property: &str,
    reservations: &[Reservation],
    inventory: &[InventoryUnit],
    holidays: &[HolidayPeriod],
    region: Option<&str>,
    base: NaiveDate,
    diag: &mut RunDiagnostics,
) -> Vec<MoveSuggestion> {
    let mut moves = Vec::new();
    for holiday in upcoming(holidays, base, engine.config().holiday_horizon_days) {
        if region.is_some_and(|r| !holiday.applies_to(r)) {
            continue;
        }
        let mut holiday_diag = RunDiagnostics::new(property);
        moves.extend(analyze_holiday(
            engine,
            property,
            reservations,
            inventory,
            holiday,
            &mut holiday_diag,
        ));
        diag.absorb(holiday_diag, &holiday.name);
    }
    moves
}
