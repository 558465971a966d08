use std::collections::BTreeMap;

use crate::model::MoveSuggestion;

use super::search::AcceptedMove;

/// Label moves `"{category}.{move}"`, both 1-based. Categories are numbered
/// in lexicographic name order, counting only those with at least one move;
/// moves keep the order they were accepted in.
pub fn assign_sequential_order(property: &str, accepted: &BTreeMap<String, Vec<AcceptedMove<'_>>>) -> Vec<MoveSuggestion> {
    accepted
        .values()
        .filter(|moves| !moves.is_empty())
        .enumerate()
        .flat_map(|(ci, moves)| {
            moves
                .iter()
                .enumerate()
                .map(move |(mi, m)| to_suggestion(property, m, format!("{}.{}", ci + 1, mi + 1)))
        })
        .collect()
}

fn to_suggestion(property: &str, m: &AcceptedMove<'_>, label: String) -> MoveSuggestion {
    let r = m.reservation;
    MoveSuggestion {
        property: property.to_string(),
        reservation_id: r.id.clone(),
        guest_name: r.guest.clone(),
        source_unit: m.from.clone(),
        target_unit: m.to.clone(),
        category: r.category.clone(),
        status: r.status,
        arrive_date: r.stay.start,
        depart_date: r.stay.end,
        nights: r.nights,
        improvement_score: m.improvement,
        nights_freed: m.nights_freed,
        reason_text: m.reason(),
        sequential_order: label,
        is_holiday_move: false,
        holiday: None,
    }
}
