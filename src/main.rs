use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use traveler::{
    AppState, ItineraryRequest, ItineraryService, Language, MapboxGeocoder, Sanitizer,
    SuggestionDebouncer, TravelerConfig, llm, logging, web,
};

#[derive(Parser)]
#[command(name = "traveler", version, about = "Tailor-made travel itineraries generated by an LLM")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate one itinerary and print it as JSON
    Plan {
        #[arg(short, long)]
        destination: String,
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(short, long, default_value = "english")]
        language: Language,
    },
    /// Read destination queries from stdin, one per line, and print debounced suggestions
    Suggest,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TravelerConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.log_level.as_deref())?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState {
                itineraries: Arc::new(itinerary_service(&config)?),
                geocoder: Arc::new(MapboxGeocoder::from_config(&config.geocoding)?),
            };
            web::run(state, &config.server).await
        }
        Command::Plan {
            destination,
            days,
            language,
        } => {
            let request = ItineraryRequest::new(destination, days, language)?;
            match itinerary_service(&config)?.request_itinerary(&request).await {
                Ok(itinerary) => {
                    println!("{}", serde_json::to_string_pretty(&itinerary)?);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    Err(anyhow::Error::new(e).context("Itinerary generation failed"))
                }
            }
        }
        Command::Suggest => suggest(&config).await,
    }
}

fn itinerary_service(config: &TravelerConfig) -> Result<ItineraryService> {
    let client = llm::create_client(&config.llm)?;
    Ok(ItineraryService::new(
        client,
        Sanitizer::new(config.sanitizer.boundary),
    ))
}

async fn suggest(config: &TravelerConfig) -> Result<()> {
    let geocoder = Arc::new(MapboxGeocoder::from_config(&config.geocoding)?);
    let mut debouncer = SuggestionDebouncer::new(geocoder, config.geocoding.debounce_window());
    let mut suggestions = debouncer.subscribe();

    let printer = tokio::spawn(async move {
        while suggestions.changed().await.is_ok() {
            let set = suggestions.borrow_and_update().clone();
            if set.is_empty() {
                println!("[{}] no suggestions", set.query);
                continue;
            }
            println!("[{}]", set.query);
            for suggestion in &set.suggestions {
                println!(
                    "  {} ({})",
                    suggestion.display_name,
                    suggestion.coordinates.format_coordinates()
                );
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        debouncer.on_query(&line);
    }

    // let the last query fire before tearing down
    tokio::time::sleep(debouncer.window() + config.geocoding.timeout()).await;
    drop(debouncer);
    printer.await?;
    info!("Suggestion session finished");
    Ok(())
}
