use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Text};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tracing::{debug, info};
use weatherdash_core::{
    Config, Controller, Coordinates, FixedGeolocator, GeminiSummarizer, Phase, PhaseEvent,
    source_from_config, view,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard with AI summaries")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API keys, the default city and an optional fixed location.
    Configure,

    /// Show the dashboard for a city.
    Show {
        /// City name; the configured default city when absent.
        city: Option<String>,
    },

    /// Show the dashboard for your location.
    Here {
        /// Latitude in decimal degrees; overrides the configured location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees; overrides the configured location.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Load the default city, then keep prompting for searches.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        debug!(command = ?self.command, city = %config.default_city, "configuration loaded");

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city } => {
                let (mut controller, progress) = build_controller(&config)?;
                match city {
                    Some(city) => controller.search(&city).await,
                    None => controller.initial_load().await,
                };
                print_dashboard(controller, progress).await;
                Ok(())
            }
            Command::Here { lat, lon } => {
                let position = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
                    _ => config.location,
                };
                let (mut controller, progress) = build_controller(&config)?;
                controller.geolocate(&FixedGeolocator::new(position)).await;
                print_dashboard(controller, progress).await;
                Ok(())
            }
            Command::Interactive => interactive(&config).await,
        }
    }
}

fn build_controller(config: &Config) -> anyhow::Result<(Controller, JoinHandle<()>)> {
    let weather = source_from_config(&config.weather)?;
    let summary = GeminiSummarizer::new(config.summary.clone())?;

    let (tx, rx) = mpsc::unbounded_channel();
    let controller = Controller::new(Arc::from(weather), Arc::new(summary), &config.default_city)
        .with_events(tx);

    Ok((controller, spawn_progress(rx)))
}

/// Prints loading indicators as the controller moves through a cycle.
fn spawn_progress(mut rx: mpsc::UnboundedReceiver<PhaseEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event.phase {
                Phase::LoadingWeather => eprintln!("{}", view::LOADING_WEATHER),
                Phase::LoadingSummary => eprintln!("{}", view::LOADING_SUMMARY),
                _ => {}
            }
        }
    })
}

async fn print_dashboard(controller: Controller, progress: JoinHandle<()>) {
    let screen = view::render_dashboard(controller.state(), Instant::now());
    // dropping the controller closes the event channel, so the printer finishes
    drop(controller);
    let _ = progress.await;
    println!("{screen}");
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let (mut controller, _progress) = build_controller(config)?;
    let locator = FixedGeolocator::new(config.location);

    controller.initial_load().await;
    println!("{}", view::render_dashboard(controller.state(), Instant::now()));

    loop {
        let input = Text::new("City:")
            .with_placeholder(view::SEARCH_PLACEHOLDER)
            .with_help_message(view::SEARCH_HELP)
            .prompt();

        match input {
            Ok(query) if query.trim() == "@" => controller.geolocate(&locator).await,
            Ok(query) => controller.search(&query).await,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                debug!(cycles = controller.cycle(), "leaving interactive mode");
                break;
            }
            Err(e) => return Err(e).context("Failed to read search input"),
        };

        controller.tick(Instant::now());
        println!("{}", view::render_dashboard(controller.state(), Instant::now()));
    }

    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let weather_key = Password::new("OpenWeather API key (leave empty to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    if !weather_key.trim().is_empty() {
        config.weather.api_key = Some(weather_key.trim().to_string());
    }

    let summary_key = Password::new("Gemini API key (leave empty to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    if !summary_key.trim().is_empty() {
        config.summary.api_key = Some(summary_key.trim().to_string());
    }

    let city = Text::new("Default city:").with_default(&config.default_city).prompt()?;
    if !city.trim().is_empty() {
        config.default_city = city.trim().to_string();
    }

    let fixed = Confirm::new("Use a fixed location for `weatherdash here`?")
        .with_default(config.location.is_some())
        .prompt()?;
    config.location = if fixed {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a decimal number")
            .prompt()?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a decimal number")
            .prompt()?;
        Some(Coordinates::new(lat, lon))
    } else {
        None
    };

    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());

    Ok(())
}
