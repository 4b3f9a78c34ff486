mod module;

use clap::{Parser, Subcommand};
use futures::channel::oneshot;

use flux_bridge::bridge::Bridge;
use flux_bridge::{conduit, flux};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the module, run the diagnostic call, disconnect
    Demo,
    /// Only run the diagnostic call
    Runtest,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ERROR: {:#}", e); // Pretty format with all causes
        std::process::exit(1);
    }
}

async fn run() -> Result<(), anyhow::Error> {
    // Initialize logger
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let cli = Cli::parse();

    // Wire a UI side and an in-process stand-in for the remote Flux module
    // together over a duplex conduit.
    let (ui_side, module_side) = conduit::duplex(100);
    tokio::spawn(module::run(module_side));

    let bridge =
        conduit::from_sink_source("flux module".to_string(), ui_side.sink, ui_side.source, None)
            .await?;

    match cli.command {
        Commands::Demo => {
            let (tx, rx) = oneshot::channel();
            flux::connect_to_flux(&bridge, move |status| {
                let _ = tx.send(status);
            })?;
            println!("connection status: {}", rx.await?);

            let fields = bridge.ask(flux::RUNTEST, Vec::new()).await?;
            println!(
                "test result: {}",
                fields.first().map(String::as_str).unwrap_or_default()
            );

            let (tx, rx) = oneshot::channel();
            flux::disconnect_from_flux(&bridge, move |status| {
                let _ = tx.send(status);
            })?;
            println!("connection status: {}", rx.await?);
        }
        Commands::Runtest => {
            let fields = bridge.ask(flux::RUNTEST, Vec::new()).await?;
            println!(
                "test result: {}",
                fields.first().map(String::as_str).unwrap_or_default()
            );
        }
    }

    Ok(())
}
