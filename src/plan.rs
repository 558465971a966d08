use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::{DefragError, Engine, RunDiagnostics, ingest};
use crate::holiday;
use crate::merge;
use crate::model::*;

/// Everything known about one property for one analysis, as delivered by the
/// data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySnapshot {
    pub property: String,
    pub window: Window,
    pub reservations: Vec<ReservationRow>,
    pub inventory: Vec<InventoryUnit>,
    #[serde(default)]
    pub holidays: Vec<HolidayEntry>,
    /// Region code used to pick applicable holidays; all apply when absent.
    #[serde(default)]
    pub region: Option<String>,
}

/// A holiday as listed in a snapshot. Extended bounds may be left out, in
/// which case they are derived from the engine's extension setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub importance: ImportanceTier,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub extended_start: Option<NaiveDate>,
    #[serde(default)]
    pub extended_end: Option<NaiveDate>,
    #[serde(default = "national")]
    pub region: String,
}

fn national() -> String {
    "national".to_string()
}

impl HolidayEntry {
    /// Resolve extended bounds. Fails if either the canonical or the
    /// extended range ends before it starts.
    pub fn to_period(&self, extension_days: u64) -> Result<HolidayPeriod, DefragError> {
        if self.end < self.start {
            return Err(self.inverted(self.start, self.end));
        }
        let mut period = HolidayPeriod::new(
            self.name.clone(),
            self.kind.clone(),
            self.importance,
            self.start,
            self.end,
            self.region.clone(),
            extension_days,
        );
        if let Some(start) = self.extended_start {
            period.extended_start = start;
        }
        if let Some(end) = self.extended_end {
            period.extended_end = end;
        }
        if period.extended_end < period.extended_start {
            return Err(self.inverted(period.extended_start, period.extended_end));
        }
        Ok(period)
    }

    fn inverted(&self, start: NaiveDate, end: NaiveDate) -> DefragError {
        DefragError::InvalidHoliday {
            holiday: self.name.clone(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyReport {
    pub property: String,
    pub moves: Vec<MoveSuggestion>,
    pub diagnostics: RunDiagnostics,
}

/// Regular window, then upcoming holidays from `base`, merged.
pub fn plan(engine: &Engine, snapshot: &PropertySnapshot, base: NaiveDate) -> Result<PropertyReport, DefragError> {
    let window = Window::new(snapshot.window.start, snapshot.window.end)?;
    let mut diagnostics = RunDiagnostics::new(&snapshot.property);
    let reservations = ingest(&snapshot.reservations, &mut diagnostics);
    engine.check_inventory(&reservations, &snapshot.inventory, &mut diagnostics);

    let regular = engine.analyze_with(
        &snapshot.property,
        &reservations,
        &snapshot.inventory,
        window,
        &mut diagnostics,
    );
    let mut holidays: Vec<HolidayPeriod> = Vec::with_capacity(snapshot.holidays.len());
    for entry in &snapshot.holidays {
        match entry.to_period(engine.config().holiday_extension_days) {
            Ok(period) => holidays.push(period),
            Err(e) => diagnostics.skip_record(e),
        }
    }
    let holiday_moves = holiday::analyze_upcoming(
        engine,
        &snapshot.property,
        &reservations,
        &snapshot.inventory,
        &holidays,
        snapshot.region.as_deref(),
        base,
        &mut diagnostics,
    );

    let moves = if holiday_moves.is_empty() {
        regular
    } else {
        merge::merge(holiday_moves, regular, &window)
    };
    tracing::info!(
        property = %snapshot.property,
        moves = moves.len(),
        accepted = diagnostics.accepted_total(),
        rejected = diagnostics.rejected_total(),
        warnings = diagnostics.warnings.len(),
        "plan complete"
    );

    Ok(PropertyReport {
        property: snapshot.property.clone(),
        moves,
        diagnostics,
    })
}
