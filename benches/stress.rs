use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use tokio::task::JoinSet;

use defrag::config::EngineConfig;
use defrag::engine::Engine;
use defrag::model::*;

/// Small deterministic generator so every run analyzes the same property.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

struct Property {
    reservations: Vec<Reservation>,
    inventory: Vec<InventoryUnit>,
    window: Window,
}

/// `categories` × `units_per` units, each filled with short stays separated
/// by random gaps across a `days`-long window.
fn synthetic(seed: u64, categories: usize, units_per: usize, days: u64) -> Property {
    let mut rng = Lcg(seed);
    let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
    let end = start + Days::new(days - 1);
    let mut reservations = Vec::new();
    let mut inventory = Vec::new();

    for c in 0..categories {
        let category = format!("Type{c}");
        for u in 0..units_per {
            let unit = format!("{category}-{u}");
            inventory.push(InventoryUnit {
                unit: unit.clone(),
                category: category.clone(),
            });
            let mut cursor = start + Days::new(rng.below(3));
            while cursor < end {
                let nights = 1 + rng.below(5);
                let depart = cursor + Days::new(nights);
                let id = reservations.len();
                reservations.push(Reservation {
                    id: format!("R{id}"),
                    guest: format!("Guest {id}"),
                    unit: unit.clone(),
                    category: category.clone(),
                    status: if rng.below(10) == 0 {
                        ReservationStatus::Arrived
                    } else {
                        ReservationStatus::Confirmed
                    },
                    stay: NightSpan::new(cursor, depart),
                    nights: nights as u32,
                    fixed: rng.below(20) == 0,
                });
                cursor = depart + Days::new(rng.below(4));
            }
        }
    }

    Property {
        reservations,
        inventory,
        window: Window { start, end },
    }
}

fn phase1_single_property(engine: &Engine) {
    for (units_per, days) in [(4, 14), (8, 30), (16, 30), (24, 45)] {
        let property = synthetic(7, 3, units_per, days);
        let mut latencies = Vec::new();
        let mut moves = 0;
        for _ in 0..5 {
            let t = Instant::now();
            let analysis = engine.analyze(
                "Bench",
                &property.reservations,
                &property.inventory,
                property.window,
            );
            latencies.push(t.elapsed());
            moves = analysis.moves.len();
        }
        println!(
            "  {} units, {} reservations, {days} days: {moves} moves",
            property.inventory.len(),
            property.reservations.len()
        );
        print_latency("analysis", &mut latencies);
    }
}

async fn phase2_concurrent(engine: Arc<Engine>) {
    let n_properties = 16;
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for seed in 0..n_properties {
        let engine = engine.clone();
        tasks.spawn_blocking(move || {
            let property = synthetic(seed, 4, 10, 30);
            let t = Instant::now();
            engine.analyze(
                &format!("P{seed}"),
                &property.reservations,
                &property.inventory,
                property.window,
            );
            t.elapsed()
        });
    }

    let mut latencies = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        latencies.push(joined.unwrap());
    }

    let elapsed = start.elapsed();
    println!(
        "  {n_properties} properties in {:.2}s = {:.1} properties/sec",
        elapsed.as_secs_f64(),
        n_properties as f64 / elapsed.as_secs_f64()
    );
    print_latency("per-property analysis", &mut latencies);
}

fn phase3_round_cap(engine_config: EngineConfig) {
    let property = synthetic(11, 1, 20, 60);
    for max_rounds in [1, 5, 20, 100] {
        let engine = Engine::new(EngineConfig {
            max_rounds,
            ..engine_config.clone()
        });
        let t = Instant::now();
        let analysis = engine.analyze(
            "Bench",
            &property.reservations,
            &property.inventory,
            property.window,
        );
        let outcome = analysis
            .diagnostics
            .categories
            .values()
            .map(|c| format!("{:?}", c.outcome))
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "  max_rounds={max_rounds}: {} moves in {:.2}ms ({outcome})",
            analysis.moves.len(),
            t.elapsed().as_secs_f64() * 1000.0
        );
    }
}

#[tokio::main]
async fn main() {
    let config = EngineConfig::from_env();
    let engine = Arc::new(Engine::new(config.clone()));

    println!("=== defrag stress benchmark ===");

    println!("\n[phase 1] single property, growing size");
    phase1_single_property(&engine);

    println!("\n[phase 2] concurrent properties");
    phase2_concurrent(engine.clone()).await;

    println!("\n[phase 3] round cap");
    phase3_round_cap(config);

    println!("\n=== benchmark complete ===");
}
