use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::debug;

use routecast::format::format_date_time;
use routecast::{
    NominatimGeocoder, OpenWeatherMapClient, RouteRequest, RouteSettings, RouteStore,
    RoutePlanner, RoutecastConfig, RoutecastError, UnitSystem, telemetry,
};

/// Weather forecasts along a road trip, waypoint by waypoint
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Weather at each waypoint between two places
    Plan {
        /// Departure place
        from: String,
        /// Arrival place
        to: String,
        /// Departure time, RFC 3339 or "YYYY-MM-DD HH:MM" in UTC (default: now)
        #[arg(long)]
        departure: Option<String>,
        /// Waypoints between departure and arrival
        #[arg(long)]
        stops: Option<usize>,
        /// Unit system: metric/celsius or imperial/fahrenheit
        #[arg(long)]
        units: Option<UnitSystem>,
        /// Print the annotated route as JSON
        #[arg(long)]
        json: bool,
        /// Keep the route in the saved routes
        #[arg(long)]
        save: bool,
    },
    /// Manage saved routes
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
    /// Check that the weather API key is accepted
    CheckKey,
}

#[derive(Subcommand, Debug)]
enum SavedAction {
    /// List saved routes
    List,
    /// Delete a saved route
    Delete {
        /// Route id as shown by `saved list`
        id: u64,
    },
}

fn parse_departure(value: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty() && *v != "now") else {
        return Ok(Utc::now());
    };
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .with_context(|| format!("Invalid departure time '{value}'"))
}

async fn plan(
    config: &RoutecastConfig,
    request: RouteRequest,
    json: bool,
    save: bool,
) -> Result<()> {
    let geocoder = NominatimGeocoder::new(&config.geocoding)?;
    let weather = OpenWeatherMapClient::new(&config.weather)?;
    let planner = RoutePlanner::new(geocoder, weather, RouteSettings::from_config(config));

    let route = planner.plan(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&route)?);
    } else {
        print!("{route}");
    }

    if save {
        let store = RouteStore::open(&config.storage.path)?;
        let saved = store.save(route.to_saved(Utc::now())).await?;
        println!("\n💾 Saved as route {}", saved.id);
    }
    Ok(())
}

async fn saved(config: &RoutecastConfig, action: SavedAction) -> Result<()> {
    let store = RouteStore::open(&config.storage.path)?;
    match action {
        SavedAction::List => {
            let routes = store.list().await?;
            if routes.is_empty() {
                println!("No saved routes");
            }
            for route in routes {
                println!(
                    "{}  {} → {}  ({}, {})",
                    route.id,
                    route.departure,
                    route.arrival,
                    format_date_time(route.departure_time),
                    route.units
                );
            }
        }
        SavedAction::Delete { id } => {
            if store.delete(id).await? {
                println!("Deleted route {id}");
            } else {
                println!("No saved route with id {id}");
            }
        }
    }
    Ok(())
}

async fn check_key(config: &RoutecastConfig) -> Result<()> {
    let client = OpenWeatherMapClient::new(&config.weather)?;
    if client.validate_api_key().await {
        println!("✅ API key accepted");
        Ok(())
    } else {
        Err(anyhow!("API key rejected by the weather service"))
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = RoutecastConfig::load_from_path(cli.config)?;
    telemetry::init(&config.logging)?;
    debug!("Configuration loaded");

    match cli.command {
        Command::Plan {
            from,
            to,
            departure,
            stops,
            units,
            json,
            save,
        } => {
            let request = RouteRequest {
                from,
                to,
                departure: parse_departure(departure.as_deref())?,
                units: units.unwrap_or(config.units.temperature),
                stops,
            };
            plan(&config, request, json, save).await
        }
        Command::Saved { action } => saved(&config, action).await,
        Command::CheckKey => check_key(&config).await,
    }
}

/// Lines printed on stderr when a command fails
fn failure_report(err: &RoutecastError) -> String {
    let mut report = format!("❌ {}\n   {err}", err.user_message());
    if err.is_retryable() {
        report.push_str("\n   This may be temporary; run the command again to retry.");
    }
    report
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<RoutecastError>() {
                Some(err) => eprintln!("{}", failure_report(err)),
                None => eprintln!("❌ {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
