use clap::Parser;
use fogsim_rs::scenario::ScenarioSpec;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fog-sim", about = "Run a fog computing scenario JSON")]
struct Args {
    /// Path to scenario.json
    #[arg(long)]
    scenario: PathBuf,

    /// Write the event trace (JSON array) to this file
    #[arg(long)]
    trace_json: Option<PathBuf>,

    /// Write the run report (JSON object) to this file
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Override the horizon (time units, inclusive)
    #[arg(long, conflicts_with = "to_completion")]
    until_ms: Option<f64>,

    /// Ignore the horizon and run until the event queue drains
    #[arg(long)]
    to_completion: bool,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many events
    #[arg(long)]
    max_events: Option<u64>,

    /// Transmit one tuple at a time per link direction
    #[arg(long)]
    link_queueing: bool,

    /// Disable logging
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let mut spec = ScenarioSpec::load(&args.scenario)?;
    if let Some(until) = args.until_ms {
        spec.sim.until_ms = Some(until);
    }
    if args.to_completion {
        spec.sim.until_ms = None;
    }
    if let Some(seed) = args.seed {
        spec.sim.seed = seed;
    }
    if args.max_events.is_some() {
        spec.sim.max_events = args.max_events;
    }
    if args.link_queueing {
        spec.sim.link_queueing = true;
    }

    let mut scenario = spec.build()?;
    if args.trace_json.is_some() {
        scenario.world.enable_trace();
    }
    let report = scenario.run()?;
    print!("{report}");

    if let Some(path) = &args.report_json {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }
    if let (Some(path), Some(trace)) = (&args.trace_json, &scenario.world.trace) {
        fs::write(path, serde_json::to_string(&trace.events)?)?;
    }
    Ok(())
}
