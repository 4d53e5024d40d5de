use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use parachute_simulation::*;

/// Parachute descent simulator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON scenario file; the built-in 4 km drop is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed time step in seconds
    #[arg(short, long)]
    time_step: Option<f64>,

    /// Number of dispersed runs; 1 runs the nominal scenario with telemetry
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    /// Seed for the dispersion sampler
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(time_step) = args.time_step {
        config.time_step = time_step;
        config.validate()?;
    }

    let sensor = GroundSensor::default();

    if args.runs > 1 {
        let mut runner = DispersionRunner::new(config, Dispersion::default(), args.seed);
        for (index, summary) in runner.run(args.runs, &sensor).iter().enumerate() {
            info!(
                "Run {}: mass {:.1} kg, drop {}, deployed at {}, touchdown {}",
                index,
                summary.mass,
                Telemetry::format_altitude(summary.initial_altitude),
                summary
                    .deployment_altitude
                    .map_or("never".to_string(), Telemetry::format_altitude),
                summary
                    .touchdown_speed
                    .map_or("not landed".to_string(), |speed| format!("{:.2} m/s", speed))
            );
        }
        return Ok(());
    }

    let mut parachute = config.build()?;
    let mut telemetry = Telemetry::new();

    while parachute.elapsed_time() < config.max_time {
        let inputs = StepInputs {
            ground_contact: sensor.in_contact(parachute.altitude()),
            manual_deploy: false,
        };
        match parachute.step(config.time_step, inputs) {
            Ok(result) => {
                telemetry.collect_data(&result);

                if result.grounded {
                    info!("Load has landed. Ending simulation.");
                    break;
                }
            }
            Err(e) => {
                error!("Error during simulation step: {}", e);
                break;
            }
        }
    }

    telemetry.display_data();

    Ok(())
}
