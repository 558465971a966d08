use chrono::NaiveDate;

use crate::model::AvailabilityRun;

use super::availability::category_runs;
use super::occupancy::OccupancyRead;

/// Shape of a category's free capacity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryScore {
    /// Lower is better. Zero when nothing is free.
    pub fragmentation: f64,
    /// Higher is better. Must not drop when a move is accepted.
    pub quality: f64,
    pub total_gaps: usize,
    /// Σ length² over all runs.
    pub strategic_value: u64,
    /// Σ length over all runs.
    pub total_available: u32,
    pub longest_run: u32,
}

impl CategoryScore {
    pub fn from_runs<'r>(runs: impl IntoIterator<Item = &'r AvailabilityRun>) -> Self {
        let lengths: Vec<u32> = runs
            .into_iter()
            .map(|r| r.nights)
            .filter(|&n| n > 0)
            .collect();
        let total_gaps = lengths.len();
        let strategic_value: u64 = lengths.iter().map(|&n| (n as u64) * (n as u64)).sum();
        let total_available: u32 = lengths.iter().sum();
        let longest_run = lengths.iter().copied().max().unwrap_or(0);

        Self {
            fragmentation: fragmentation(total_gaps, strategic_value),
            quality: quality(&lengths),
            total_gaps,
            strategic_value,
            total_available,
            longest_run,
        }
    }
}

/// Many short gaps cost, long runs pay back quadratically.
pub fn fragmentation(total_gaps: usize, strategic_value: u64) -> f64 {
    if total_gaps == 0 {
        return 0.0;
    }
    total_gaps as f64 * 10.0 - strategic_value as f64 / 100.0
}

/// Rewards long average and longest runs, and few runs overall.
pub fn quality(lengths: &[u32]) -> f64 {
    if lengths.is_empty() {
        return 0.0;
    }
    let count = lengths.len() as f64;
    let avg = lengths.iter().map(|&n| n as f64).sum::<f64>() / count;
    let max = lengths.iter().copied().max().unwrap_or(0) as f64;
    avg * 0.4 + max * 0.4 + (1.0 / count) * 20.0
}

pub fn score_category<V>(view: &V, units: &[String], dates: &[NaiveDate]) -> CategoryScore
where
    V: OccupancyRead + ?Sized,
{
    CategoryScore::from_runs(&category_runs(view, units, dates))
}
