//! ManyWorlds Simulator CLI
//!
//! Run branching scenarios and print or export the resulting multiverse.

use clap::Parser;
use manyworlds_core::HookRegistry;
use manyworlds_sim::scenarios::ScenarioId;
use manyworlds_sim::{ScenarioOutcome, ScenarioRunner, SimConfig, SimExport, TreeRenderer, TreeStyle};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Quantum Multiverse (Many-Worlds) Simulation CLI
#[derive(Parser, Debug)]
#[command(name = "manyworlds-sim")]
#[command(about = "Run lazy many-worlds branching scenarios", long_about = None)]
struct Args {
    /// Scenario to run (spin, cascade, definite, all)
    #[arg(short = 'S', long, default_value = "spin")]
    scenario: String,

    /// Seed for randomized scenarios
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Measurement levels for the cascade scenario
    #[arg(short, long, default_value = "3")]
    depth: usize,

    /// Maximum outcomes per random superposition
    #[arg(long, default_value = "3")]
    max_outcomes: usize,

    /// Tree style (plain, decorated)
    #[arg(long, default_value = "decorated")]
    style: String,

    /// Show each leaf's history in the tree
    #[arg(long)]
    history: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export the multiverse to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn main() {
    let args = Args::parse();

    // Initialize logging (RUST_LOG overrides the flags)
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("--- Quantum Multiverse Simulation (Many-Worlds Interpretation) ---");
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: spin, cascade, definite, all");
            std::process::exit(2);
        })]
    };

    let style: TreeStyle = args.style.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    });

    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        std::process::exit(2);
    }

    let config = SimConfig {
        seed: args.seed,
        depth: args.depth,
        max_outcomes: args.max_outcomes,
    };

    let mut hooks = HookRegistry::new();
    hooks.register_universe_creation_observer(|universe, outcome| {
        debug!("  observer: universe {} is the '{}' branch", universe.id(), outcome);
        Ok(())
    });
    hooks.register_post_measurement_hook(|universe, observable| {
        debug!(
            "  hook: '{}' split universe {} into {} branch(es)",
            observable,
            universe.id(),
            universe.children().len()
        );
        Ok(())
    });

    let runner = ScenarioRunner::new(config).with_hooks(hooks);
    let renderer = TreeRenderer::new(style).with_history(args.history);

    let mut outcomes: Vec<ScenarioOutcome> = Vec::new();
    for scenario in &scenarios {
        match runner.run(*scenario) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                error!("✗ {} aborted: {}", scenario.name(), e);
                std::process::exit(1);
            }
        }
    }

    if let (Some(path), Some(outcome)) = (&args.export, outcomes.first()) {
        match SimExport::new(outcome).write_to_file(path) {
            Ok(()) => info!("Exported {} universes to {}", outcome.result.stats.universe_count, path),
            Err(e) => {
                error!("Failed to write export: {}", e);
                std::process::exit(1);
            }
        }
    }

    let failed_count = outcomes.iter().filter(|o| !o.result.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": outcomes.len(),
            "passed": outcomes.len() - failed_count,
            "failed": failed_count,
            "results": outcomes.iter().map(|o| {
                serde_json::json!({
                    "scenario": o.result.scenario.name(),
                    "seed": o.result.seed,
                    "passed": o.result.passed,
                    "universes": o.result.stats.universe_count,
                    "leaves": o.result.stats.leaf_count,
                    "max_depth": o.result.stats.max_depth,
                    "total_leaf_weight": o.result.stats.total_leaf_weight,
                    "refused_measurements": o.result.refused_measurements,
                    "failure_reason": o.result.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to encode summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        for outcome in &outcomes {
            let result = &outcome.result;
            println!();
            println!("--- Final Multiverse State: {} ---", result.scenario.name());
            print!("{}", renderer.render(&outcome.root));

            if result.passed {
                info!(
                    "✓ {} (seed={}) PASSED: {} universes, {} leaves, leaf weight {:.5}",
                    result.scenario.name(),
                    result.seed,
                    result.stats.universe_count,
                    result.stats.leaf_count,
                    result.stats.total_leaf_weight
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
