use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use routecheck_core::{Config, Endpoint, EvaluationError, RouteEvaluator};
use tracing::info;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "routecheck",
    version,
    about = "Check whether either end of a route currently has adverse weather"
)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the AccuWeather API key and locale.
    Configure,

    /// Compare current weather at the start and end of a route.
    Check {
        /// Start point, e.g. "Moscow".
        start: String,

        /// End point, e.g. "Saint Petersburg".
        end: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show current weather and verdict for a single place.
    Show {
        /// Place name.
        place: String,

        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Check { start, end, json } => {
                let evaluator = evaluator()?;
                let result = evaluator.evaluate(&start, &end).await.map_err(report)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print!("{}", output::render_route(&result));
                }
                Ok(())
            }
            Command::Show { place, json } => {
                let evaluator = evaluator()?;
                let location = evaluator
                    .evaluate_location(Endpoint::Start, &place)
                    .await
                    .map_err(report)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&location)?);
                } else {
                    print!("{}", output::render_location(&location));
                }
                Ok(())
            }
        }
    }
}

fn evaluator() -> anyhow::Result<RouteEvaluator> {
    let config = Config::load()?;
    RouteEvaluator::from_config(&config)
}

/// Log the full error chain, hand the user the short message.
fn report(err: EvaluationError) -> anyhow::Error {
    let message = err.user_message();
    let kind = err.kind();
    let retryable = err.is_retryable();
    let chain = anyhow::Error::new(err);
    info!(?kind, retryable, "Evaluation failed: {chain:#}");
    anyhow::anyhow!(message)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("AccuWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key.to_string());

    let language = Text::new("Locale for weather responses:")
        .with_default(&config.accuweather.language)
        .prompt()
        .context("Failed to read locale")?;
    config.accuweather.language = language.trim().to_string();

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}
