use chrono::NaiveDate;

use crate::dates::next_day;
use crate::model::AvailabilityRun;

use super::occupancy::OccupancyRead;

// ── Contiguous availability ──────────────────────────────────────

/// Maximal free runs of `unit` over `dates` (ascending, contiguous).
///
/// A run still open on the last date ends one day past the window: it is
/// treated as open-ended availability, not as a closed gap.
pub fn availability_runs<V>(view: &V, unit: &str, dates: &[NaiveDate]) -> Vec<AvailabilityRun>
where
    V: OccupancyRead + ?Sized,
{
    let mut runs = Vec::new();
    let mut open: Option<(NaiveDate, u32)> = None;

    for &date in dates {
        if view.is_occupied(unit, date) {
            if let Some((start, nights)) = open.take() {
                runs.push(AvailabilityRun {
                    start,
                    end: date,
                    nights,
                });
            }
        } else if let Some((_, nights)) = open.as_mut() {
            *nights += 1;
        } else {
            open = Some((date, 1));
        }
    }

    if let Some((start, nights)) = open
        && let Some(&last) = dates.last()
    {
        runs.push(AvailabilityRun {
            start,
            end: next_day(last),
            nights,
        });
    }

    runs
}

/// Runs of every unit in a category, in unit order.
pub fn category_runs<V>(view: &V, units: &[String], dates: &[NaiveDate]) -> Vec<AvailabilityRun>
where
    V: OccupancyRead + ?Sized,
{
    units
        .iter()
        .flat_map(|unit| availability_runs(view, unit, dates))
        .collect()
}

/// The run of `unit` that contains `night`, if the night is free.
pub fn run_containing<V>(view: &V, unit: &str, dates: &[NaiveDate], night: NaiveDate) -> Option<AvailabilityRun>
where
    V: OccupancyRead + ?Sized,
{
    availability_runs(view, unit, dates)
        .into_iter()
        .find(|run| run.start <= night && night < run.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::occupancy::{OccupancyModel, Relocations};
    use crate::model::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn booking(id: &str, unit: &str, arrive: u32, depart: u32) -> Reservation {
        Reservation {
            id: id.into(),
            guest: id.into(),
            unit: unit.into(),
            category: "Site".into(),
            status: ReservationStatus::Confirmed,
            stay: NightSpan::new(d(arrive), d(depart)),
            nights: depart - arrive,
            fixed: false,
        }
    }

    fn model(reservations: &[Reservation], last_day: u32) -> OccupancyModel<'_> {
        let inventory = vec![InventoryUnit {
            unit: "S1".into(),
            category: "Site".into(),
        }];
        let window = Window::new(d(1), d(last_day)).unwrap();
        OccupancyModel::build(reservations, &inventory, window, &Relocations::new())
    }

    fn run(start: u32, end: u32) -> AvailabilityRun {
        AvailabilityRun {
            start: d(start),
            end: d(end),
            nights: end - start,
        }
    }

    #[test]
    fn empty_unit_is_one_open_run() {
        let m = model(&[], 7);
        assert_eq!(availability_runs(&m, "S1", &m.dates), vec![run(1, 8)]);
    }

    #[test]
    fn fully_booked_unit_has_no_runs() {
        let r = vec![booking("1", "S1", 1, 8)];
        let m = model(&r, 7);
        assert!(availability_runs(&m, "S1", &m.dates).is_empty());
    }

    #[test]
    fn booking_splits_runs() {
        let r = vec![booking("1", "S1", 3, 5)];
        let m = model(&r, 7);
        assert_eq!(availability_runs(&m, "S1", &m.dates), vec![run(1, 3), run(5, 8)]);
    }

    #[test]
    fn back_to_back_bookings_leave_no_gap() {
        let r = vec![booking("1", "S1", 2, 4), booking("2", "S1", 4, 6)];
        let m = model(&r, 7);
        assert_eq!(availability_runs(&m, "S1", &m.dates), vec![run(1, 2), run(6, 8)]);
    }

    #[test]
    fn runs_partition_the_window() {
        let r = vec![booking("1", "S1", 2, 3), booking("2", "S1", 5, 7), booking("3", "S1", 9, 10)];
        let m = model(&r, 12);
        let runs = availability_runs(&m, "S1", &m.dates);
        let free: u32 = runs.iter().map(|r| r.nights).sum();
        let occupied = m.dates.iter().filter(|&&n| m.is_occupied("S1", n)).count() as u32;
        assert_eq!(free + occupied, m.dates.len() as u32);
        // Disjoint and maximal: no two runs touch.
        for pair in runs.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn run_containing_finds_the_right_run() {
        let r = vec![booking("1", "S1", 3, 5)];
        let m = model(&r, 7);
        assert_eq!(run_containing(&m, "S1", &m.dates, d(6)), Some(run(5, 8)));
        assert_eq!(run_containing(&m, "S1", &m.dates, d(3)), None);
    }

    #[test]
    fn scan_is_deterministic() {
        let r = vec![booking("1", "S1", 3, 5)];
        let m = model(&r, 7);
        assert_eq!(
            availability_runs(&m, "S1", &m.dates),
            availability_runs(&m, "S1", &m.dates)
        );
    }
}
