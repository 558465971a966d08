mod availability;
mod diagnostics;
mod error;
mod importance;
mod occupancy;
mod ordering;
mod scoring;
mod search;

pub use availability::{availability_runs, category_runs, run_containing};
pub use diagnostics::{CategoryDiagnostics, RunDiagnostics, SearchOutcome};
pub use error::DefragError;
pub use importance::{importance_by_category, strategic_importance};
pub use occupancy::{MoveSandbox, OccupancyModel, OccupancyRead, Relocations, UnitCalendar, current_unit, ingest};
pub use ordering::assign_sequential_order;
pub use scoring::{CategoryScore, fragmentation, quality, score_category};
pub use search::{AcceptedMove, SearchResult, moveable, search_category};

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use tracing::info;

use crate::config::EngineConfig;
use crate::model::*;
use crate::observability::ANALYSIS_DURATION_SECONDS;

/// Moves for one property and window, plus what happened on the way.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub moves: Vec<MoveSuggestion>,
    pub diagnostics: RunDiagnostics,
}

/// The defragmentation engine. Stateless between runs; one instance can be
/// shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a full analysis with a fresh diagnostics sink.
    pub fn analyze(
        &self,
        property: &str,
        reservations: &[Reservation],
        inventory: &[InventoryUnit],
        window: Window,
    ) -> Analysis {
        let mut diagnostics = RunDiagnostics::new(property);
        self.check_inventory(reservations, inventory, &mut diagnostics);
        let moves = self.analyze_with(property, reservations, inventory, window, &mut diagnostics);
        Analysis { moves, diagnostics }
    }

    /// Warn about an empty inventory and about reservation categories with
    /// no units. Independent of the window, so callers running several
    /// windows over one property check once.
    pub fn check_inventory(&self, reservations: &[Reservation], inventory: &[InventoryUnit], diag: &mut RunDiagnostics) {
        if inventory.is_empty() {
            diag.warn(DefragError::EmptyInventory);
            return;
        }
        let known: BTreeSet<&str> = inventory.iter().map(|u| u.category.as_str()).collect();
        let orphaned: BTreeSet<&str> = reservations
            .iter()
            .map(|r| r.category.as_str())
            .filter(|c| !known.contains(c))
            .collect();
        for category in orphaned {
            diag.warn(DefragError::UnknownCategory {
                category: category.to_string(),
            });
        }
    }

    /// Occupancy → importance → per-category search → ordering. Inventory
    /// problems are not reported here; see [`Engine::check_inventory`].
    pub fn analyze_with(
        &self,
        property: &str,
        reservations: &[Reservation],
        inventory: &[InventoryUnit],
        window: Window,
        diag: &mut RunDiagnostics,
    ) -> Vec<MoveSuggestion> {
        let started = Instant::now();
        let _span = tracing::info_span!(
            "analysis",
            run = %diag.run_id,
            property,
            start = %window.start,
            end = %window.end
        )
        .entered();

        if inventory.is_empty() {
            return Vec::new();
        }

        let baseline = OccupancyModel::build(reservations, inventory, window, &Relocations::new());

        let span = window.span();
        let booked: BTreeSet<&str> = reservations
            .iter()
            .filter(|r| r.stay.overlaps(&span))
            .map(|r| r.category.as_str())
            .collect();

        let importance = importance_by_category(&baseline, &self.config);
        let mut relocations = Relocations::new();
        let mut accepted: BTreeMap<String, Vec<AcceptedMove<'_>>> = BTreeMap::new();

        for (category, &weight) in &importance {
            // Nothing booked in the window: nothing to consolidate.
            if weight == 0.0 || !booked.contains(category.as_str()) {
                diag.skip_category(category, weight);
                continue;
            }
            let result = search_category(
                reservations,
                inventory,
                window,
                category,
                weight,
                &mut relocations,
                &self.config,
            );
            diag.record_category(category, result.diagnostics);
            accepted.insert(category.clone(), result.moves);
        }

        let moves = assign_sequential_order(property, &accepted);
        metrics::histogram!(ANALYSIS_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        info!(
            moves = moves.len(),
            skipped = diag.skipped_categories.len(),
            "analysis complete"
        );
        moves
    }
}
