//! The `walk` subcommand: a scripted stroll through the reference data.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::info;

use waymate::monitor::{GeosafetyMonitor, MonitorConfig};

use super::common;

#[derive(Args)]
pub struct WalkArgs {
    /// Load geofence reference data from a JSON file instead of the demo set
    #[arg(long, value_name = "FILE")]
    pub zones: Option<PathBuf>,

    /// Milliseconds to pause between steps
    #[arg(long, default_value_t = 250)]
    pub step_ms: u64,
}

pub fn run(args: WalkArgs) -> Result<(), Box<dyn Error>> {
    let reference = common::load_reference(args.zones.as_deref())?;
    info!(
        zones = reference.zones.len(),
        segments = reference.segments.len(),
        "Reference data loaded"
    );
    let mut monitor = GeosafetyMonitor::new(reference, MonitorConfig::default());

    // A stroll from the campus, past the poor-lighting zone, and back out.
    let steps = [
        common::at(51.505, -0.09),
        common::at(51.506, -0.095),
        common::at(51.507, -0.1),
        common::at(51.5078, -0.105),
        common::at(51.5081, -0.1101),
        common::at(51.509, -0.115),
        common::at(51.512, -0.125),
    ];

    println!("Starting walk ({} steps)", steps.len());

    for (index, position) in steps.iter().enumerate() {
        monitor.update_position(*position)?;

        println!("Step {}: {}", index + 1, position);
        if let Some(zone) = monitor.safe_zone_containing(position) {
            if let waymate::geofence::GeofenceZone::Safe { label, .. } = zone {
                println!("  In safe zone: {label}");
            }
        }
        match monitor.current_warning() {
            Some(warning) => println!("  ⚠ {}", warning.message),
            None => println!("  No risk warnings"),
        }

        // Ask for a route recommendation once we are underway.
        if index == 2 {
            let segment = monitor.select_route(2)?;
            println!("  Route selected: {} [{}]", segment.label, segment.risk);
        }

        std::thread::sleep(Duration::from_millis(args.step_ms));
    }

    if let Some(track) = monitor.track().derived_track() {
        println!("Walk complete; direction of travel ~{track:.0}°");
    } else {
        println!("Walk complete");
    }

    Ok(())
}
