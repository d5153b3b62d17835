use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::config::Config;
use crate::converter::convert;
use crate::model::{LAT_TO_METERS, LNG_TO_METERS, SEOUL_STATION, validate_coordinates};
use crate::render::{render_coords, render_state};
use crate::resolver::{GeminiResolver, StopResolver};
use crate::session::{SearchState, Session};

mod config;
mod converter;
mod error;
mod model;
mod render;
mod resolver;
mod server;
mod session;
mod telemetry;
mod utils;

/// Turns South Korean bus stops into Minecraft coordinates around Seoul Station.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Gemini model used for stop lookups
    #[arg(long, global = true)]
    model: Option<String>,

    /// Seconds to wait for a stop lookup
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a single bus stop ID
    Resolve { stop_id: String },
    /// Read bus stop IDs from stdin, one per line
    Interactive,
    /// Serve the search over HTTP
    Serve {
        /// Address to listen on, defaults to BIND_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// Convert a latitude/longitude pair without any lookup
    Convert {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<ExitCode> {
    _ = dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs.max(1));
    }

    let _telemetry = telemetry::init(&config)?;
    info!("starting with {:?}", config);

    match cli.command {
        Command::Convert { lat, lng } => {
            validate_coordinates(lat, lng)?;
            let coords = convert(lat, lng, &SEOUL_STATION, LAT_TO_METERS, LNG_TO_METERS);
            print!("{}", render_coords(&coords));
            Ok(ExitCode::SUCCESS)
        }
        Command::Resolve { stop_id } => {
            let mut session = Session::new(GeminiResolver::from_config(&config)?);

            match session.submit_search(&stop_id).await {
                None => {
                    eprintln!("Please enter a bus stop ID.");
                    Ok(ExitCode::FAILURE)
                }
                Some(state) => {
                    println!("{}", render_state(state));
                    match state {
                        SearchState::Success(_) => Ok(ExitCode::SUCCESS),
                        _ => Ok(ExitCode::FAILURE),
                    }
                }
            }
        }
        Command::Interactive => {
            let resolver = GeminiResolver::from_config(&config)?;
            interactive(Session::new(resolver)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { addr } => {
            let resolver: Arc<dyn StopResolver> = Arc::new(GeminiResolver::from_config(&config)?);
            server::serve(addr.as_deref().unwrap_or(&config.bind_addr), resolver).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn interactive<R: StopResolver>(mut session: Session<R>) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render_state(session.state()));

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }

        if let Some((request_id, stop_id)) = session.begin_search(line) {
            println!("{}", render_state(session.state()));
            let outcome = session.resolve(&stop_id).await;
            session.finish_search(request_id, outcome);
            println!("{}", render_state(session.state()));
        }
    }

    Ok(())
}
