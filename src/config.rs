use serde::{Deserialize, Serialize};

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Search rounds per category before giving up. A heuristic bound, not a
    /// convergence guarantee.
    pub max_rounds: usize,
    /// A date counts as "well supplied" when at least this many units are free.
    pub crowded_free_units: usize,
    /// Categories with a larger share of well-supplied dates are skipped.
    pub crowded_date_fraction: f64,
    pub holiday_extension_days: u64,
    pub holiday_horizon_days: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            crowded_free_units: 3,
            crowded_date_fraction: 0.7,
            holiday_extension_days: 7,
            holiday_horizon_days: 60,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `DEFRAG_*` environment variables. Unparsable
    /// values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse().ok());
        Self {
            max_rounds: parse("DEFRAG_MAX_ROUNDS").unwrap_or(defaults.max_rounds),
            crowded_free_units: parse("DEFRAG_CROWDED_FREE_UNITS").unwrap_or(defaults.crowded_free_units),
            crowded_date_fraction: lookup("DEFRAG_CROWDED_FRACTION")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.crowded_date_fraction),
            holiday_extension_days: lookup("DEFRAG_HOLIDAY_EXTENSION_DAYS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.holiday_extension_days),
            holiday_horizon_days: lookup("DEFRAG_HOLIDAY_HORIZON_DAYS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.holiday_horizon_days),
        }
    }
}
