use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clima_core::{
    Config, Coordinate, DisplayStore, Resolution, ResolutionCoordinator, SequencingPolicy,
    WidgetProvider, geocode::geocoder_from_config, provider::weather_client_from_config,
};
use inquire::{Password, PasswordDisplayMode, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "clima", version, about = "City weather, forecast and map center")]
pub struct Cli {
    /// Drop results that arrive after a newer request already answered.
    #[arg(long, global = true)]
    pub latest_issued: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and preferences.
    Configure,

    /// Resolve one or more cities; all are submitted at once.
    Show {
        /// City names. Defaults to the configured startup city.
        cities: Vec<String>,

        /// Print the display every time a lookup lands.
        #[arg(long)]
        follow: bool,
    },

    /// Move the map center and resolve whatever locality is there.
    Pan {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Report a device position, as the location service would.
    Locate {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Print the home-screen widget timeline.
    Widget {
        /// Fetch live conditions instead of the static entry.
        #[arg(long)]
        live: bool,

        /// Keep printing a new timeline at each refresh.
        #[arg(long)]
        watch: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { cities, follow } => {
                let coordinator = build_coordinator(self.latest_issued)?;
                let resolutions = if cities.is_empty() {
                    vec![coordinator.start()]
                } else {
                    cities.iter().map(|c| coordinator.submit_city(c)).collect()
                };
                settle(&coordinator, resolutions, follow).await;
                Ok(())
            }
            Command::Pan { lat, lon } => {
                let coordinator = build_coordinator(self.latest_issued)?;
                let center = Coordinate::new(lat, lon)?;
                settle(&coordinator, vec![coordinator.pan_map(center)], false).await;
                Ok(())
            }
            Command::Locate { lat, lon } => {
                let coordinator = build_coordinator(self.latest_issued)?;
                let position = Coordinate::new(lat, lon)?;
                settle(&coordinator, vec![coordinator.device_located(position)], false).await;
                Ok(())
            }
            Command::Widget { live, watch } => widget(live, watch).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        cfg.set_api_key(api_key.trim().to_string());
    }

    let city = Text::new("Startup city:")
        .with_default(&cfg.default_city)
        .prompt()
        .context("Failed to read startup city")?;
    cfg.default_city = city;

    let policies = vec!["arrival-order", "latest-issued"];
    let choice = Select::new("When requests overlap, keep:", policies)
        .with_help_message("arrival-order: whatever lands last; latest-issued: the newest request")
        .prompt()
        .context("Failed to read sequencing policy")?;
    cfg.sequencing = match choice {
        "latest-issued" => SequencingPolicy::LatestIssued,
        _ => SequencingPolicy::ArrivalOrder,
    };

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_coordinator(latest_issued: bool) -> anyhow::Result<ResolutionCoordinator> {
    let cfg = Config::load()?;
    let weather = weather_client_from_config(&cfg)?;
    let geocoder = geocoder_from_config(&cfg)?;

    let policy = effective_policy(latest_issued, cfg.sequencing);
    tracing::debug!(
        city = %cfg.default_city,
        language = %cfg.language,
        base_url = %cfg.base_url,
        ?policy,
        "loaded configuration"
    );

    Ok(ResolutionCoordinator::new(
        Arc::new(weather),
        Arc::new(geocoder),
        Arc::new(DisplayStore::default()),
    )
    .with_policy(policy)
    .with_default_city(cfg.default_city))
}

/// `--latest-issued` wins over the configured policy; it can only tighten it.
fn effective_policy(latest_issued: bool, configured: SequencingPolicy) -> SequencingPolicy {
    if latest_issued { SequencingPolicy::LatestIssued } else { configured }
}

async fn settle(coordinator: &ResolutionCoordinator, resolutions: Vec<Resolution>, follow: bool) {
    let all = async {
        for resolution in resolutions {
            resolution.settled().await;
        }
    };

    if !follow {
        all.await;
        println!("{}", render::display(&coordinator.store().snapshot()));
        return;
    }

    let mut rx = coordinator.store().subscribe();
    println!("{}", render::display(&rx.borrow_and_update()));
    tokio::pin!(all);
    loop {
        tokio::select! {
            _ = &mut all => break,
            Ok(()) = rx.changed() => {
                println!("{}", render::display(&rx.borrow_and_update()));
            }
        }
    }
    if rx.has_changed().unwrap_or(false) {
        println!("{}", render::display(&rx.borrow_and_update()));
    }
}

async fn widget(live: bool, watch: bool) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let mut provider = WidgetProvider::from_config(&cfg);
    tracing::debug!(live, watch, refresh_minutes = cfg.widget_refresh_minutes, "starting widget");
    if live {
        provider = provider.with_live_source(Arc::new(weather_client_from_config(&cfg)?));
    }

    loop {
        let now = chrono::Utc::now();
        let timeline = provider.timeline(now).await;
        println!("{}", render::timeline(&timeline));

        if !watch {
            return Ok(());
        }
        let wait = (timeline.next_refresh - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
    }
}
