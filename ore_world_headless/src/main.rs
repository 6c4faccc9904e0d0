// CLI entry point for the headless ore world driver.
//
// Loads a scenario (and optionally a config) from JSON, runs the sim for a
// fixed number of frames, and prints a population summary. Progress lines
// go through `tracing`; set `RUST_LOG=debug` to watch spawns and transforms.
//
// Usage:
//   ore_world_headless --scenario <PATH> [OPTIONS]
//     --config <PATH>     Sim config JSON (default: built-in defaults)
//     --seed <N>          PRNG seed (default: 0)
//     --frames <N>        Frames to run (default: 600)
//     --frame-ms <N>      Virtual time per frame (default: 100)

use ore_world_headless::{RunOptions, run};
use ore_world_sim::config::SimConfig;
use ore_world_sim::scenario::Scenario;
use tracing::warn;
use tracing_subscriber::EnvFilter;

struct Args {
    scenario: String,
    config: Option<String>,
    options: RunOptions,
}

fn main() {
    init_tracing();
    let args = parse_args();

    let scenario = read_file(&args.scenario);
    let scenario = Scenario::from_json(&scenario).unwrap_or_else(|e| {
        eprintln!("Failed to parse scenario {}: {e}", args.scenario);
        std::process::exit(1);
    });
    let config = match &args.config {
        Some(path) => SimConfig::from_json(&read_file(path)).unwrap_or_else(|e| {
            eprintln!("Failed to parse config {path}: {e}");
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    };

    let (summary, report) = match run(&scenario, config, &args.options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            std::process::exit(1);
        }
    };

    if !report.is_clean() {
        warn!(skipped = report.skipped(), "some scenario records were not placed");
    }
    println!("placed={} skipped={}", report.placed.len(), report.skipped());
    println!("{summary}");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_file(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {path}: {e}");
        std::process::exit(1);
    })
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Args {
    let mut scenario = None;
    let mut config = None;
    let mut options = RunOptions::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                scenario = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--scenario requires a path");
                    std::process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                config = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--seed" => {
                i += 1;
                options.seed = parse_number(&args, i, "--seed");
            }
            "--frames" => {
                i += 1;
                options.frames = parse_number(&args, i, "--frames");
            }
            "--frame-ms" => {
                i += 1;
                options.frame_ms = parse_number(&args, i, "--frame-ms");
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(scenario) = scenario else {
        eprintln!("--scenario is required");
        print_usage();
        std::process::exit(1);
    };
    Args {
        scenario,
        config,
        options,
    }
}

fn parse_number(args: &[String], i: usize, flag: &str) -> u64 {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("{flag} requires a valid number");
        std::process::exit(1);
    })
}

fn print_usage() {
    println!("Usage: ore_world_headless --scenario <PATH> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>     Sim config JSON (default: built-in defaults)");
    println!("  --seed <N>          PRNG seed (default: 0)");
    println!("  --frames <N>        Frames to run (default: 600)");
    println!("  --frame-ms <N>      Virtual time per frame (default: 100)");
    println!("  --help, -h          Show this help");
}
