use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use ulid::Ulid;

use crate::observability::{CATEGORIES_SKIPPED_TOTAL, RECORDS_SKIPPED_TOTAL};

use super::DefragError;

/// How a category's search loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchOutcome {
    /// No candidate improved the score.
    Exhausted,
    /// Stopped at `max_rounds` with an improving move still available.
    RoundCapReached,
    /// Importance was zero; nothing was searched.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDiagnostics {
    pub importance: f64,
    pub accepted: usize,
    /// Candidates dropped because quality or total availability regressed.
    pub rejected: usize,
    pub rounds: usize,
    pub outcome: SearchOutcome,
}

impl CategoryDiagnostics {
    pub fn skipped(importance: f64) -> Self {
        Self {
            importance,
            accepted: 0,
            rejected: 0,
            rounds: 0,
            outcome: SearchOutcome::Skipped,
        }
    }
}

/// Per-run diagnostics sink. One instance per analysis, passed down
/// explicitly and handed back with the result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDiagnostics {
    pub run_id: Ulid,
    pub property: String,
    #[serde(serialize_with = "messages")]
    pub warnings: Vec<DefragError>,
    pub skipped_categories: Vec<String>,
    pub categories: BTreeMap<String, CategoryDiagnostics>,
}

impl RunDiagnostics {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            run_id: Ulid::new(),
            property: property.into(),
            warnings: Vec::new(),
            skipped_categories: Vec::new(),
            categories: BTreeMap::new(),
        }
    }

    /// A record was dropped from the input.
    pub fn skip_record(&mut self, err: DefragError) {
        tracing::warn!(property = %self.property, "skipping record: {err}");
        metrics::counter!(RECORDS_SKIPPED_TOTAL).increment(1);
        self.warnings.push(err);
    }

    pub fn warn(&mut self, err: DefragError) {
        tracing::warn!(property = %self.property, "{err}");
        self.warnings.push(err);
    }

    pub fn skip_category(&mut self, category: &str, importance: f64) {
        tracing::debug!(category, "importance {importance:.3}, skipping");
        metrics::counter!(CATEGORIES_SKIPPED_TOTAL).increment(1);
        self.skipped_categories.push(category.to_string());
        self.categories
            .insert(category.to_string(), CategoryDiagnostics::skipped(importance));
    }

    pub fn record_category(&mut self, category: &str, diag: CategoryDiagnostics) {
        self.categories.insert(category.to_string(), diag);
    }

    pub fn accepted_total(&self) -> usize {
        self.categories.values().map(|c| c.accepted).sum()
    }

    pub fn rejected_total(&self) -> usize {
        self.categories.values().map(|c| c.rejected).sum()
    }

    /// Fold another run's findings in, e.g. a holiday window pass. Its
    /// categories are keyed `"{label}/{category}"`.
    pub fn absorb(&mut self, other: RunDiagnostics, label: &str) {
        self.warnings.extend(other.warnings);
        self.skipped_categories
            .extend(other.skipped_categories.iter().map(|c| format!("{label}/{c}")));
        for (category, diag) in other.categories {
            self.categories.insert(format!("{label}/{category}"), diag);
        }
    }
}

fn messages<S: Serializer>(errors: &[DefragError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}
