use clap::{Parser, ValueEnum};
use fogsim_rs::app::{Application, EdgeKind, Selectivity, direction};
use fogsim_rs::fog::{ActuatorSpec, DeviceSpec, Distribution, FogWorld, SensorSpec, SimConfig};
use fogsim_rs::placement::{Controller, PlacementMapping};
use fogsim_rs::sim::Simulator;
use std::fs;
use std::path::PathBuf;

/// Where `ProcessingModule` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Placement {
    Cloud,
    Edge,
}

#[derive(Debug, Parser)]
#[command(
    name = "custom-example",
    about = "Two-tier cloud + fog node example: sensor -> ClientModule -> ProcessingModule -> actuator"
)]
struct Args {
    #[arg(long, value_enum, default_value_t = Placement::Cloud)]
    placement: Placement,

    /// Horizon (time units, inclusive)
    #[arg(long, default_value_t = 1000.0)]
    until_ms: f64,

    /// Sensor inter-arrival time (time units)
    #[arg(long, default_value_t = 5.0)]
    sensor_interval_ms: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the run report (JSON object) to this file
    #[arg(long)]
    report_json: Option<PathBuf>,
}

const APP_ID: &str = "MyApp";

fn application() -> Application {
    let mut app = Application::new(APP_ID);
    app.add_module("ClientModule", 10)
        .add_module("ProcessingModule", 20)
        .add_app_edge(
            "SENSOR",
            "ClientModule",
            1000.0,
            500.0,
            "SENSOR",
            direction::UP,
            EdgeKind::SensorInput,
        )
        .add_app_edge(
            "ClientModule",
            "ProcessingModule",
            2000.0,
            1000.0,
            "DATA",
            direction::UP,
            EdgeKind::Module,
        )
        .add_app_edge(
            "ProcessingModule",
            "ACTUATOR",
            500.0,
            100.0,
            "RESULT",
            direction::DOWN,
            EdgeKind::ActuatorOutput,
        )
        .add_tuple_mapping("ClientModule", "SENSOR", "DATA", Selectivity::fractional(1.0))
        .add_tuple_mapping("ProcessingModule", "DATA", "RESULT", Selectivity::fractional(1.0))
        .add_loop(&["SENSOR", "ClientModule", "ProcessingModule", "ACTUATOR"]);
    app
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut world = FogWorld::new(SimConfig {
        until_ms: Some(args.until_ms),
        seed: args.seed,
        ..SimConfig::default()
    });
    world.add_device(
        &DeviceSpec::new("cloud", 44_800.0)
            .with_ram(40_000)
            .with_bandwidth(10_000.0, 10_000.0)
            .with_rate_per_mips(0.01)
            .with_power(16.0 * 103.0, 16.0 * 83.25),
    )?;
    world.add_device(
        &DeviceSpec::new("fogNode", 2_800.0)
            .with_parent("cloud", 1)
            .with_ram(4_000)
            .with_bandwidth(10_000.0, 10_000.0)
            .with_uplink_latency(20.0)
            .with_power(107.339, 83.4333),
    )?;
    world.add_sensor(
        SensorSpec::new(
            "sensor-1",
            "SENSOR",
            APP_ID,
            Distribution::deterministic(args.sensor_interval_ms),
        )
        .with_gateway("fogNode")
        .with_latency(1.0),
    );
    world.add_actuator(
        ActuatorSpec::new("actuator-1", APP_ID, "ACTUATOR")
            .with_gateway("fogNode")
            .with_latency(1.0),
    );

    let mut mapping = PlacementMapping::new();
    mapping.add("ClientModule", "fogNode")?;
    mapping.add(
        "ProcessingModule",
        match args.placement {
            Placement::Cloud => "cloud",
            Placement::Edge => "fogNode",
        },
    )?;

    let mut sim = Simulator::default();
    Controller::submit(&mut world, &mut sim, application(), &mapping)?;
    let report = Controller::run(&mut sim, &mut world)?;
    print!("{report}");

    if let Some(path) = &args.report_json {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
