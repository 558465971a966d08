use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::model::*;
use crate::observability::{CANDIDATES_REJECTED_TOTAL, MOVES_ACCEPTED_TOTAL, ROUND_CAP_REACHED_TOTAL};

use super::availability::run_containing;
use super::diagnostics::{CategoryDiagnostics, SearchOutcome};
use super::occupancy::{MoveSandbox, OccupancyModel, OccupancyRead, Relocations, current_unit};
use super::scoring::{CategoryScore, score_category};

/// A move the search decided to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedMove<'a> {
    pub reservation: &'a Reservation,
    pub from: String,
    pub to: String,
    /// Drop in fragmentation score. Always positive.
    pub improvement: f64,
    /// Length of the source unit's free run that absorbs the vacated nights.
    pub nights_freed: u32,
    pub before: CategoryScore,
    pub after: CategoryScore,
}

impl AcceptedMove<'_> {
    pub fn reason(&self) -> String {
        format!(
            "Move to {} frees {} contiguous nights in {}; fragmentation {:.2} -> {:.2}",
            self.to, self.nights_freed, self.from, self.before.fragmentation, self.after.fragmentation
        )
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    pub moves: Vec<AcceptedMove<'a>>,
    pub diagnostics: CategoryDiagnostics,
}

/// Result of one search round.
enum Round<'a> {
    Improved(AcceptedMove<'a>),
    Exhausted,
}

/// Reservations the search may relocate: confirmed or unconfirmed, not
/// fixed, in `category`, with the whole stay inside the window. Input order
/// is kept; it is the enumeration order of the search.
pub fn moveable<'a>(reservations: &'a [Reservation], category: &str, window: &Window) -> Vec<&'a Reservation> {
    reservations
        .iter()
        .filter(|r| r.category == category && r.status.is_moveable() && !r.fixed && r.within(window))
        .collect()
}

/// Greedy single-move search for one category, bounded by
/// `config.max_rounds`. Accepted moves are written to `relocations` so later
/// rounds (and the caller) see them.
///
/// Once the cap is hit the category is evaluated one more time without
/// accepting anything: `RoundCapReached` only if an improving move was left.
pub fn search_category<'a>(
    reservations: &'a [Reservation],
    inventory: &[InventoryUnit],
    window: Window,
    category: &str,
    importance: f64,
    relocations: &mut Relocations,
    config: &EngineConfig,
) -> SearchResult<'a> {
    let _span = tracing::debug_span!("category", category, importance).entered();

    let candidates = moveable(reservations, category, &window);
    let mut moves = Vec::new();
    let mut rejected = 0usize;
    let mut rounds = 0usize;

    let outcome = loop {
        if candidates.is_empty() {
            debug!("no moveable reservations");
            break SearchOutcome::Exhausted;
        }
        let capped = rounds >= config.max_rounds;
        let mut unused = 0usize;
        let rejects = if capped { &mut unused } else { &mut rejected };

        let model = OccupancyModel::build(reservations, inventory, window, relocations);
        let round = search_round(&model, category, &candidates, relocations, rejects);
        if !capped {
            rounds += 1;
        }
        match round {
            Round::Improved(left) if capped => {
                warn!(
                    rounds,
                    reservation = %left.reservation.id,
                    "round cap reached with an improving move left"
                );
                metrics::counter!(ROUND_CAP_REACHED_TOTAL).increment(1);
                break SearchOutcome::RoundCapReached;
            }
            Round::Improved(accepted) => {
                info!(
                    reservation = %accepted.reservation.id,
                    from = %accepted.from,
                    to = %accepted.to,
                    improvement = accepted.improvement,
                    "accepted move"
                );
                metrics::counter!(MOVES_ACCEPTED_TOTAL).increment(1);
                relocations.insert(accepted.reservation.id.clone(), accepted.to.clone());
                moves.push(accepted);
            }
            Round::Exhausted => {
                debug!(rounds, "no improving move left");
                break SearchOutcome::Exhausted;
            }
        }
    };

    metrics::counter!(CANDIDATES_REJECTED_TOTAL).increment(rejected as u64);
    SearchResult {
        diagnostics: CategoryDiagnostics {
            importance,
            accepted: moves.len(),
            rejected,
            rounds,
            outcome,
        },
        moves,
    }
}

/// Try every candidate in every other unit of the category and keep the one
/// that lowers fragmentation most. Candidates are tried in input order, target
/// units in ascending id order; on equal improvement the first one found wins.
fn search_round<'a>(
    model: &OccupancyModel<'a>,
    category: &str,
    candidates: &[&'a Reservation],
    relocations: &Relocations,
    rejected: &mut usize,
) -> Round<'a> {
    let units = model.units(category);
    let dates = &model.dates;
    let current = score_category(model, units, dates);
    let mut best: Option<AcceptedMove<'a>> = None;

    for &reservation in candidates {
        let from = current_unit(reservation, relocations);
        for to in units {
            if to == from || model.conflicts(to, &reservation.stay) {
                continue;
            }

            let sandbox = MoveSandbox::new(model, reservation, from, to);
            let after = score_category(&sandbox, units, dates);
            if after.quality < current.quality || after.total_available < current.total_available {
                debug!(
                    reservation = %reservation.id,
                    to = %to,
                    quality_before = current.quality,
                    quality_after = after.quality,
                    "rejected: availability regresses"
                );
                *rejected += 1;
                continue;
            }

            let improvement = current.fragmentation - after.fragmentation;
            if improvement <= 0.0 || best.as_ref().is_some_and(|b| improvement <= b.improvement) {
                continue;
            }
            let nights_freed = run_containing(&sandbox, from, dates, reservation.stay.start)
                .map_or(0, |run| run.nights);
            best = Some(AcceptedMove {
                reservation,
                from: from.to_string(),
                to: to.clone(),
                improvement,
                nights_freed,
                before: current,
                after,
            });
        }
    }

    match best {
        Some(m) => Round::Improved(m),
        None => Round::Exhausted,
    }
}
