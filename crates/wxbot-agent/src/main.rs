use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wxbot_agent::{Agent, AnthropicClient};
use wxbot_core::Config;
use wxbot_weather::{WeatherProvider, WeatherService};

/// Answer one chat event and print the response envelope as JSON.
#[derive(Debug, Parser)]
#[command(name = "wxbot", version)]
struct Cli {
    /// Event JSON file (reads stdin when omitted)
    #[arg(long)]
    event: Option<PathBuf>,

    /// Config file (defaults to $WXBOT_CONFIG or the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    wxbot_core::init(&config.logging.filter)?;

    let validation = config.validate();
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        anyhow::bail!(
            "Configuration validation failed: {}",
            validation.error_summary()
        );
    }

    let provider = WeatherProvider::new(&config.weather).context("Failed to build weather client")?;
    let llm = AnthropicClient::new(&config.llm).context("Failed to build LLM client")?;
    let agent = Agent::new(WeatherService::new(provider), llm);

    let raw = match &cli.event {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read event from stdin")?;
            raw
        }
    };

    let envelope = agent.handle_raw(&raw).await;
    tracing::info!("Responding with status {}", envelope.status_code);

    println!(
        "{}",
        serde_json::to_string(&envelope).context("Failed to serialize response")?
    );
    Ok(())
}
