use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use defrag::config::EngineConfig;
use defrag::engine::Engine;
use defrag::runner;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("DEFRAG_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    defrag::observability::init(metrics_port)?;

    let base_date = match std::env::var("DEFRAG_BASE_DATE") {
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")?,
        Err(_) => chrono::Local::now().date_naive(),
    };

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        return Err("usage: defrag <snapshot.json>...".into());
    }

    let config = EngineConfig::from_env();
    info!("defrag starting");
    info!("  snapshots: {}", paths.len());
    info!("  base date: {base_date}");
    info!("  max rounds per category: {}", config.max_rounds);
    info!("  metrics: {}", metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let engine = Arc::new(Engine::new(config));
    let mut failures = 0usize;
    for result in runner::run_files(engine, paths, base_date).await {
        match result {
            Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            Err(e) => {
                tracing::error!("{e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} snapshot(s) failed").into());
    }
    Ok(())
}
