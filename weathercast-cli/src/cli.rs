use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use std::sync::Arc;
use tracing::Level;
use weathercast_core::{
    Config, FileCityStore, OpenWeatherService, RemoteWeatherRepository, WeatherError,
    WeatherResolver,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathercast", version, about = "Current weather for a city or coordinates")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show weather for a city; defaults to the last city searched.
    Show {
        /// City name, e.g. "Austin" or "Paris,FR".
        city: Option<String>,

        /// Also print feels-like, min/max, pressure and humidity.
        #[arg(long)]
        details: bool,
    },

    /// Show weather for a latitude/longitude pair.
    Coords {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(long)]
        details: bool,
    },

    /// Print the last searched city.
    Last,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, details } => {
                let resolver = build_resolver()?;
                resolver.fetch_for_city(city.as_deref()).await.map_err(report)?;
                print_current(&resolver, details)
            }
            Command::Coords { lat, lon, details } => {
                let resolver = build_resolver()?;
                resolver.fetch_for_coordinates(lat, lon).await.map_err(report)?;
                print_current(&resolver, details)
            }
            Command::Last => {
                let store = FileCityStore::open_default()?;
                let state = store.load_state()?;
                println!("{}", output::render_last_city(&state));
                Ok(())
            }
        }
    }
}

pub fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_resolver() -> anyhow::Result<WeatherResolver> {
    let config = Config::load()?.with_env_overrides();
    let store = FileCityStore::open_default()?;

    let service = OpenWeatherService::from_config(reqwest::Client::new(), config);
    let repository = RemoteWeatherRepository::new(Arc::new(service));

    Ok(WeatherResolver::new(Arc::new(repository), Arc::new(store)))
}

fn print_current(resolver: &WeatherResolver, details: bool) -> anyhow::Result<()> {
    let content = resolver
        .current_content()
        .ok_or_else(|| anyhow!("No weather data available"))?;

    let record = if details { resolver.current_record() } else { None };
    println!("{}", output::render(&content, record.as_ref().map(|r| &r.main)));
    Ok(())
}

fn report(err: WeatherError) -> anyhow::Error {
    let kind = err.kind();
    let mut message = format!("{} ({kind})", kind.user_message());
    if kind.needs_reentry() {
        message.push_str("\nHint: pass a city, e.g. `weathercast show Austin`.");
    }

    anyhow::Error::new(err).context(message)
}
