mod render;

use std::io::Write;
use std::sync::Arc;

use carefinder_api::BackendClient;
use carefinder_core::AppConfig;
use carefinder_locator::{
    DeviceLocator, FacilityFinder, FixedDeviceLocation, NoDeviceLocation, Trigger,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Shown when the medical assistant cannot be reached.
const CHAT_FALLBACK_REPLY: &str = "I'm sorry, but I'm having trouble connecting to the medical \
assistant right now. Please try again later, or consult with a healthcare professional for \
urgent medical concerns.";

#[derive(Debug, Parser)]
#[command(name = "carefinder")]
#[command(about = "Find medical facilities near you")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find facilities near your current location (device fix, else IP geolocation).
    Nearby {
        /// Latitude reported by a local positioning device.
        #[arg(long, requires = "device_lng", allow_negative_numbers = true)]
        device_lat: Option<f64>,
        /// Longitude reported by a local positioning device.
        #[arg(long, requires = "device_lat", allow_negative_numbers = true)]
        device_lng: Option<f64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Find facilities near a place name or address.
    Search {
        query: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check that the backend is reachable.
    Health,
    /// Ask the medical assistant a question.
    Chat { message: String },
}

#[derive(Debug, Args, PartialEq, Eq)]
struct OutputArgs {
    /// Only show facilities whose name or address contains this text.
    #[arg(long)]
    filter: Option<String>,
    /// Only show facilities with this category tag (exact, case-insensitive).
    #[arg(long = "type", value_name = "TAG")]
    facility_type: Option<String>,
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = carefinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Nearby {
            device_lat,
            device_lng,
            output,
        }) => {
            let device: Arc<dyn DeviceLocator> = match (device_lat, device_lng) {
                (Some(lat), Some(lng)) => Arc::new(FixedDeviceLocation::new(lat, lng)),
                _ => Arc::new(NoDeviceLocation),
            };
            run_search(&config, device, Trigger::UseCurrentLocation, &output).await
        }
        Some(Commands::Search { query, output }) => {
            run_search(
                &config,
                Arc::new(NoDeviceLocation),
                Trigger::ManualQuery(query),
                &output,
            )
            .await
        }
        Some(Commands::Health) => run_health(&config).await,
        Some(Commands::Chat { message }) => run_chat(&config, &message).await,
        None => {
            println!("carefinder: run `carefinder --help` for available commands");
            Ok(())
        }
    }
}

async fn run_search(
    config: &AppConfig,
    device: Arc<dyn DeviceLocator>,
    trigger: Trigger,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let finder = FacilityFinder::new(config, device)?;
    let outcome = finder.resolve_and_rank(trigger).await;
    let state = finder.state().await;
    let filter = output.filter.as_deref();
    let facility_type = output.facility_type.as_deref();

    let mut stdout = std::io::stdout().lock();
    if output.json {
        serde_json::to_writer_pretty(
            &mut stdout,
            &render::state_json(&state, filter, facility_type),
        )?;
        writeln!(stdout)?;
    } else {
        render::write_state(&mut stdout, &state, filter, facility_type)?;
    }

    outcome.map(|_| ()).map_err(anyhow::Error::from)
}

async fn run_health(config: &AppConfig) -> anyhow::Result<()> {
    let client = BackendClient::new(
        &config.api_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    if client.health().await? {
        println!("backend at {} is healthy", config.api_base_url);
        Ok(())
    } else {
        anyhow::bail!("backend at {} reported unhealthy", config.api_base_url)
    }
}

async fn run_chat(config: &AppConfig, message: &str) -> anyhow::Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("message must not be empty");
    }
    let client = BackendClient::new(
        &config.api_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    match client.send_chat_message(message, &[]).await {
        Ok(reply) => println!("{reply}"),
        Err(error) => {
            tracing::warn!(%error, "medical assistant request failed");
            println!("{CHAT_FALLBACK_REPLY}");
        }
    }
    Ok(())
}
