use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinSet;
use tracing::info;

use crate::engine::{DefragError, Engine};
use crate::plan::{PropertyReport, PropertySnapshot, plan};

#[derive(Debug)]
pub enum RunError {
    Io(PathBuf, io::Error),
    Json(PathBuf, serde_json::Error),
    Invalid(PathBuf, DefragError),
    Join(String),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Io(path, e) => write!(f, "{}: {e}", path.display()),
            RunError::Json(path, e) => write!(f, "{}: malformed snapshot: {e}", path.display()),
            RunError::Invalid(path, e) => write!(f, "{}: {e}", path.display()),
            RunError::Join(e) => write!(f, "analysis task failed: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

pub fn load_snapshot(path: &Path) -> Result<PropertySnapshot, RunError> {
    let bytes = std::fs::read(path).map_err(|e| RunError::Io(path.to_path_buf(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| RunError::Json(path.to_path_buf(), e))
}

pub fn run_file(engine: &Engine, path: &Path, base: NaiveDate) -> Result<PropertyReport, RunError> {
    let snapshot = load_snapshot(path)?;
    info!(
        property = %snapshot.property,
        reservations = snapshot.reservations.len(),
        units = snapshot.inventory.len(),
        "loaded snapshot from {}",
        path.display()
    );
    plan(engine, &snapshot, base).map_err(|e| RunError::Invalid(path.to_path_buf(), e))
}

/// Analyze each snapshot file on its own blocking task. Results come back in
/// the order of `paths`.
pub async fn run_files(engine: Arc<Engine>, paths: Vec<PathBuf>, base: NaiveDate) -> Vec<Result<PropertyReport, RunError>> {
    let mut tasks = JoinSet::new();
    let count = paths.len();
    for (idx, path) in paths.into_iter().enumerate() {
        let engine = engine.clone();
        tasks.spawn_blocking(move || (idx, run_file(&engine, &path, base)));
    }

    let mut results = Vec::with_capacity(count);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(done) => results.push(done),
            Err(e) => results.push((usize::MAX, Err(RunError::Join(e.to_string())))),
        }
    }
    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("defrag_test_runner").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn snapshot(property: &str) -> serde_json::Value {
        json!({
            "property": property,
            "window": { "start": "2025-03-01", "end": "2025-03-10" },
            "reservations": [
                { "id": "1", "surname": "Ito", "unit": "A", "category": "Cabin",
                  "status": "confirmed", "arrive": "02/03/2025", "depart": "04/03/2025", "nights": 2 },
                { "id": "2", "surname": "Bad", "unit": "A", "category": "Cabin",
                  "status": "confirmed", "arrive": "??", "depart": "04/03/2025" }
            ],
            "inventory": [
                { "unit": "A", "category": "Cabin" },
                { "unit": "B", "category": "Cabin" }
            ]
        })
    }

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn runs_files_in_order() {
        let dir = test_dir("order");
        let a = dir.join("a.json");
        let b = dir.join("b.json");
        fs::write(&a, snapshot("North").to_string()).unwrap();
        fs::write(&b, snapshot("South").to_string()).unwrap();

        let engine = Arc::new(Engine::default());
        let results = run_files(engine, vec![a, b], base()).await;
        let names: Vec<String> = results
            .into_iter()
            .map(|r| r.unwrap().property)
            .collect();
        assert_eq!(names, vec!["North".to_string(), "South".to_string()]);
    }

    #[tokio::test]
    async fn bad_rows_are_reported_not_fatal() {
        let dir = test_dir("bad_rows");
        let path = dir.join("p.json");
        fs::write(&path, snapshot("North").to_string()).unwrap();

        let report = run_file(&Engine::default(), &path, base()).unwrap();
        assert_eq!(report.diagnostics.warnings.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = test_dir("missing");
        let engine = Arc::new(Engine::default());
        let results = run_files(engine, vec![dir.join("nope.json")], base()).await;
        assert!(matches!(results[0], Err(RunError::Io(..))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = test_dir("malformed");
        let path = dir.join("p.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_snapshot(&path), Err(RunError::Json(..))));
    }

    #[test]
    fn inverted_window_is_an_error() {
        let dir = test_dir("inverted");
        let path = dir.join("p.json");
        let mut s = snapshot("North");
        s["window"] = json!({ "start": "2025-03-10", "end": "2025-03-01" });
        fs::write(&path, s.to_string()).unwrap();
        assert!(matches!(
            run_file(&Engine::default(), &path, base()),
            Err(RunError::Invalid(_, DefragError::InvalidWindow { .. }))
        ));
    }
}
