//! Waymate CLI - command-line front end for the safety companion core.
//!
//! The binary plays the role of the presentation layer: it feeds position
//! updates and user intent into the `waymate` library and renders the
//! derived state as terminal output.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "waymate",
    version,
    about = "Personal-safety companion: geofence warnings and SOS countdown"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a scripted walk and print the safety state after each step
    Walk(commands::walk::WalkArgs),
    /// Arm the SOS countdown and follow it to dispatch or cancellation
    Sos(commands::sos::SosArgs),
}

#[tokio::main]
async fn main() {
    waymate::logging::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Walk(args) => commands::walk::run(args),
        Command::Sos(args) => commands::sos::run(args).await,
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
