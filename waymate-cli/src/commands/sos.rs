//! The `sos` subcommand: drive the emergency-alert countdown.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use waymate::alert::AlertEvent;
use waymate::app::{AppConfig, SafetyApp};
use waymate::notify::TracingSink;
use waymate::position::{StaticPositionSource, DEFAULT_POSITION};

use super::common;

#[derive(Args)]
pub struct SosArgs {
    /// Cancel automatically after this many countdown ticks
    #[arg(long, value_name = "TICKS")]
    pub cancel_after: Option<u32>,

    /// Load geofence reference data from a JSON file instead of the demo set
    #[arg(long, value_name = "FILE")]
    pub zones: Option<PathBuf>,
}

pub async fn run(args: SosArgs) -> Result<(), Box<dyn Error>> {
    let reference = common::load_reference(args.zones.as_deref())?;
    let config = AppConfig::new(reference).with_recipients(common::demo_recipients());

    let mut app = SafetyApp::start(
        config,
        Arc::new(TracingSink),
        StaticPositionSource::new(DEFAULT_POSITION),
    )?;
    let mut events = app
        .take_events()
        .ok_or("alert event stream already taken")?;

    let alert = app.alert();
    alert.arm().await?;
    println!("SOS armed. Notifying emergency services in:");

    let mut ticks_seen = 0;
    while let Some(event) = events.recv().await {
        match event {
            AlertEvent::Armed(session) => println!("  {}", session.remaining_secs),
            AlertEvent::Tick(session) => {
                println!("  {}", session.remaining_secs);
                ticks_seen += 1;
                if args.cancel_after == Some(ticks_seen) {
                    alert.cancel().await?;
                }
            }
            AlertEvent::Cancelled(session) => {
                println!(
                    "Alert cancelled with {}s remaining.",
                    session.remaining_secs
                );
                break;
            }
            AlertEvent::Dispatched { outcome, .. } => {
                match outcome {
                    Ok(receipt) => {
                        println!("Alert dispatched to {} recipients.", receipt.delivered);
                    }
                    Err(error) => {
                        // Safety-critical: tell the user so they can retry
                        // through another channel.
                        println!("Dispatch FAILED: {error}. Call emergency services directly.");
                    }
                }
                break;
            }
        }
    }

    app.shutdown().await;
    Ok(())
}
