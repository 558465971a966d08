use std::net::SocketAddr;

// ── Search metrics ──────────────────────────────────────────────

/// Counter: moves accepted by the category search.
pub const MOVES_ACCEPTED_TOTAL: &str = "defrag_moves_accepted_total";

/// Counter: candidates dropped because quality or total availability regressed.
pub const CANDIDATES_REJECTED_TOTAL: &str = "defrag_candidates_rejected_total";

/// Counter: categories skipped with zero importance.
pub const CATEGORIES_SKIPPED_TOTAL: &str = "defrag_categories_skipped_total";

/// Counter: category searches stopped by the round cap.
pub const ROUND_CAP_REACHED_TOTAL: &str = "defrag_round_cap_reached_total";

// ── Input metrics ───────────────────────────────────────────────

/// Counter: input records dropped as invalid.
pub const RECORDS_SKIPPED_TOTAL: &str = "defrag_records_skipped_total";

/// Histogram: wall time of one analysis run in seconds.
pub const ANALYSIS_DURATION_SECONDS: &str = "defrag_analysis_duration_seconds";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
