use std::cmp::Ordering;

use crate::model::{ImportanceTier, MoveSuggestion, Window};

/// Same property, units, stay dates and guest.
pub fn is_exact_duplicate(a: &MoveSuggestion, b: &MoveSuggestion) -> bool {
    same_move(a, b) && a.arrive_date == b.arrive_date && a.depart_date == b.depart_date
}

/// Same property, units and guest, with the stays sharing more than half of
/// the holiday move's nights.
pub fn is_overlapping_duplicate(holiday_move: &MoveSuggestion, regular: &MoveSuggestion) -> bool {
    if !same_move(holiday_move, regular) {
        return false;
    }
    let shared = holiday_move.stay().overlap_nights(&regular.stay());
    shared as f64 > holiday_move.stay().nights() as f64 * 0.5
}

fn same_move(a: &MoveSuggestion, b: &MoveSuggestion) -> bool {
    a.property == b.property
        && a.source_unit == b.source_unit
        && a.target_unit == b.target_unit
        && a.guest_name == b.guest_name
}

/// Fold holiday-window moves into the regular-window list.
///
/// A holiday move whose stay overlaps the regular window is matched
/// fuzzily against regular moves, any other only exactly. Matches are
/// dropped, as are exact repeats across holidays. The result is ordered
/// High holiday moves, then Medium, then the rest, each by descending
/// improvement, and relabelled `H1, H2, ..` / `R1, R2, ..`.
pub fn merge(
    holiday_moves: Vec<MoveSuggestion>,
    regular_moves: Vec<MoveSuggestion>,
    regular_window: &Window,
) -> Vec<MoveSuggestion> {
    let regular_span = regular_window.span();
    let mut kept_holiday: Vec<MoveSuggestion> = Vec::new();

    for candidate in holiday_moves {
        let duplicate = if candidate.stay().overlaps(&regular_span) {
            regular_moves.iter().any(|r| is_overlapping_duplicate(&candidate, r))
        } else {
            regular_moves.iter().any(|r| is_exact_duplicate(&candidate, r))
        };
        if duplicate || kept_holiday.iter().any(|k| is_exact_duplicate(&candidate, k)) {
            tracing::debug!(
                reservation = %candidate.reservation_id,
                "holiday move duplicates an existing suggestion"
            );
            continue;
        }
        kept_holiday.push(candidate);
    }

    let mut merged = regular_moves;
    merged.extend(kept_holiday);
    merged.sort_by(|a, b| {
        tier_rank(a)
            .cmp(&tier_rank(b))
            .then_with(|| b.improvement_score.partial_cmp(&a.improvement_score).unwrap_or(Ordering::Equal))
    });

    let (mut holiday_seq, mut regular_seq) = (0, 0);
    for m in &mut merged {
        m.sequential_order = if tier_rank(m) < 2 {
            holiday_seq += 1;
            format!("H{holiday_seq}")
        } else {
            regular_seq += 1;
            format!("R{regular_seq}")
        };
    }
    merged
}

fn tier_rank(m: &MoveSuggestion) -> u8 {
    match m.tier() {
        Some(ImportanceTier::High) => 0,
        Some(ImportanceTier::Medium) => 1,
        _ => 2,
    }
}
