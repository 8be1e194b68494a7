use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use wearcast::{render, Snapshot, WeatherSession};
use wearcast_core::{App, AppError};

/// Current weather with advice on what to wear, what to bring and what to do
#[derive(Parser, Debug)]
#[command(name = "wearcast")]
#[command(version, long_about = None)]
struct Cli {
    /// City to look up; omit to use the current location
    #[arg(conflicts_with_all = ["lat", "lon"])]
    city: Option<String>,

    /// Latitude of the place to look up
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the place to look up
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file path
    #[arg(short, long, env = "WEARCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "wearcast_weather=trace"
    #[arg(long, env = "WEARCAST_LOG")]
    log_level: Option<String>,

    /// Keep running and refresh every N minutes
    #[arg(long, value_name = "MINUTES")]
    watch: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let message = match e.downcast_ref::<AppError>() {
                Some(app_err) => app_err.user_message(),
                None => e.to_string(),
            };
            eprintln!("❌ {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::new(cli.config.as_deref())?;

    let logging = &app.config().logging;
    let level = cli.log_level.clone().unwrap_or_else(|| logging.level.clone());
    wearcast_core::init(&level, logging.json)?;

    tracing::info!("Wearcast started");

    let session = WeatherSession::new(app)?;

    let first = match (&cli.city, cli.lat, cli.lon) {
        (Some(city), _, _) => session.search_city(city).await,
        (None, Some(lat), Some(lon)) => session.lookup_coordinates(lat, lon).await,
        _ => session.start().await,
    };
    let outcome = match first {
        Ok(snapshot) => print(&snapshot, cli.json),
        Err(e) => Err(e.into()),
    };

    if outcome.is_ok() {
        if let Some(minutes) = cli.watch.filter(|m| *m > 0) {
            watch(&session, Duration::from_secs(minutes * 60), cli.json).await;
        }
    }

    session.shutdown();
    outcome
}

/// Refresh on a fixed interval until interrupted. Failed refreshes are
/// reported and the loop carries on.
async fn watch(session: &WeatherSession, every: Duration, json: bool) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping");
                break;
            }
        }

        match session.refresh().await {
            Ok(snapshot) => {
                if let Err(e) = print(&snapshot, json) {
                    tracing::warn!("Could not print refreshed weather: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!("Refresh failed: {}", e);
                eprintln!("❌ {}", e.user_message());
            }
        }
    }
}

fn print(snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", render::json(snapshot)?);
    } else {
        println!("{}", render::text(snapshot));
    }
    Ok(())
}
