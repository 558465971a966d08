use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::EngineConfig;

use super::occupancy::{OccupancyModel, OccupancyRead};
use super::scoring::score_category;

/// How badly a category needs consolidating, in `[0, 1]`. Zero means skip.
pub fn strategic_importance<V>(view: &V, units: &[String], dates: &[NaiveDate], config: &EngineConfig) -> f64
where
    V: OccupancyRead + ?Sized,
{
    if units.len() <= 1 || dates.is_empty() {
        return 0.0;
    }

    let well_supplied = dates
        .iter()
        .filter(|&&date| {
            let free = units.iter().filter(|u| !view.is_occupied(u, date)).count();
            free >= config.crowded_free_units
        })
        .count();
    if well_supplied as f64 / dates.len() as f64 > config.crowded_date_fraction {
        return 0.0;
    }

    let unit_count = units.len() as f64;
    let score = score_category(view, units, dates);
    let avg_run = if score.total_gaps == 0 {
        0.0
    } else {
        score.total_available as f64 / score.total_gaps as f64
    };

    let contiguous = ((7.0 - avg_run) / 7.0).max(0.0);
    let fragmentation = (score.total_gaps as f64 / unit_count).min(3.0) / 3.0;
    let density = 1.0 - score.total_available as f64 / (unit_count * dates.len() as f64);

    (0.5 * contiguous + 0.3 * fragmentation + 0.2 * density).clamp(0.0, 1.0)
}

/// Importance of every category in the model.
pub fn importance_by_category(model: &OccupancyModel<'_>, config: &EngineConfig) -> BTreeMap<String, f64> {
    model
        .categories
        .iter()
        .map(|(category, units)| {
            (
                category.clone(),
                strategic_importance(model, units, &model.dates, config),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::occupancy::Relocations;
    use crate::model::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn inventory(units: &[&str]) -> Vec<InventoryUnit> {
        units
            .iter()
            .map(|u| InventoryUnit {
                unit: u.to_string(),
                category: "Villa".into(),
            })
            .collect()
    }

    fn booking(id: &str, unit: &str, arrive: u32, depart: u32) -> Reservation {
        Reservation {
            id: id.into(),
            guest: id.into(),
            unit: unit.into(),
            category: "Villa".into(),
            status: ReservationStatus::Confirmed,
            stay: NightSpan::new(d(arrive), d(depart)),
            nights: depart - arrive,
            fixed: false,
        }
    }

    #[test]
    fn single_unit_category_is_skipped() {
        let window = Window::new(d(1), d(10)).unwrap();
        let m = OccupancyModel::build(&[], &inventory(&["V1"]), window, &Relocations::new());
        assert_eq!(strategic_importance(&m, m.units("Villa"), &m.dates, &EngineConfig::default()), 0.0);
    }

    #[test]
    fn mostly_empty_category_is_skipped() {
        // Three empty units: every date has 3 free units.
        let window = Window::new(d(1), d(10)).unwrap();
        let m = OccupancyModel::build(&[], &inventory(&["V1", "V2", "V3"]), window, &Relocations::new());
        assert_eq!(strategic_importance(&m, m.units("Villa"), &m.dates, &EngineConfig::default()), 0.0);
    }

    #[test]
    fn fragmented_category_gets_weight() {
        let reservations = vec![
            booking("1", "V1", 2, 3),
            booking("2", "V1", 5, 6),
            booking("3", "V2", 3, 4),
            booking("4", "V2", 7, 8),
        ];
        let window = Window::new(d(1), d(10)).unwrap();
        let m = OccupancyModel::build(&reservations, &inventory(&["V1", "V2"]), window, &Relocations::new());
        let importance = strategic_importance(&m, m.units("Villa"), &m.dates, &EngineConfig::default());
        assert!(importance > 0.0 && importance <= 1.0);

        // V1: runs 1,2,5 ; V2: runs 2,3,3 → 6 gaps, 16 free nights of 20
        let avg = 16.0 / 6.0;
        let expected = 0.5 * ((7.0 - avg) / 7.0) + 0.3 * 1.0 + 0.2 * (1.0 - 16.0 / 20.0);
        assert!((importance - expected).abs() < 1e-9);
    }

    #[test]
    fn by_category_covers_every_category() {
        let window = Window::new(d(1), d(5)).unwrap();
        let mut inv = inventory(&["V1", "V2"]);
        inv.push(InventoryUnit {
            unit: "T1".into(),
            category: "Tent".into(),
        });
        let m = OccupancyModel::build(&[], &inv, window, &Relocations::new());
        let all = importance_by_category(&m, &EngineConfig::default());
        assert_eq!(all.len(), 2);
        assert_eq!(all["Tent"], 0.0);
    }
}
