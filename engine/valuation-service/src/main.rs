//! Valuation command-line tool
//!
//! Values players and draft picks against stored settings, prints the pick
//! chart and manages settings rows. Results are written to stdout as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use valuation_engine::{DevTrait, PhysicalAttributes, PickDescriptor, PlayerAttributes, Position};
use valuation_service::{initialize_logging, load_configuration, ServiceConfig, ValuationService};

#[derive(Parser)]
#[command(name = "valuation")]
#[command(about = "Player and draft pick trade valuation")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Franchise whose settings apply; the default row when omitted
    #[arg(short, long, global = true)]
    franchise: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a player
    Compute {
        /// Full player request as JSON, instead of the flags below
        #[arg(long, conflicts_with_all = ["overall", "age", "position", "dev_trait"])]
        json: Option<String>,

        #[arg(long, required_unless_present = "json")]
        overall: Option<i32>,

        #[arg(long, required_unless_present = "json")]
        age: Option<i32>,

        #[arg(long, required_unless_present = "json")]
        position: Option<Position>,

        /// Normal, Star, Superstar or X-Factor
        #[arg(long, required_unless_present = "json")]
        dev_trait: Option<DevTrait>,

        #[arg(long)]
        speed: Option<i32>,

        #[arg(long)]
        throw_power: Option<i32>,

        /// Height in inches
        #[arg(long)]
        height: Option<i32>,

        #[arg(long)]
        ability_slots: Option<u32>,
    },

    /// Value a current or future draft pick
    Pick {
        /// Round, 1-7
        #[arg(long)]
        round: i64,

        /// Drafts ahead, 0-2
        #[arg(long, default_value = "0")]
        years_out: i64,

        /// Projected overall pick, used by the projected baseline strategy
        #[arg(long)]
        projected: Option<i32>,
    },

    /// Print the draft pick chart
    Chart {
        /// Only this round
        #[arg(long)]
        round: Option<u32>,
    },

    /// Inspect and edit settings rows
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the settings a franchise resolves to
    Show,

    /// Merge a JSON patch into the franchise's settings
    Patch {
        /// Patch body, or @path to read it from a file
        patch: String,
    },

    /// Write the calibrated default row if none exists
    Seed {
        /// Overwrite an existing default row
        #[arg(long)]
        reset: bool,
    },
}

fn print_json<T: Serialize>(value: &T, config: &ServiceConfig) -> Result<()> {
    let out = if config.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn read_body(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path)),
        None => Ok(arg.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    initialize_logging(&config.logging)?;
    info!("Starting valuation v{}", env!("CARGO_PKG_VERSION"));

    let service = ValuationService::from_config(&config.settings)
        .await
        .context("Failed to initialize settings store")?;
    let franchise = cli.franchise.as_deref().or(config.output.franchise_id.as_deref());

    match cli.command {
        Commands::Compute {
            json,
            overall,
            age,
            position,
            dev_trait,
            speed,
            throw_power,
            height,
            ability_slots,
        } => {
            let result = match (json, overall, age, position, dev_trait) {
                (Some(body), ..) => service.value_player_json(franchise, &read_body(&body)?).await?,
                (None, Some(overall), Some(age), Some(position), Some(dev_trait)) => {
                    let attrs = PlayerAttributes::new(overall, age, position, dev_trait).with_physical(
                        PhysicalAttributes { speed, throw_power, height_in: height, ability_slots },
                    );
                    service.value_player(franchise, &attrs).await?
                }
                _ => return Err(anyhow::anyhow!("either --json or all of --overall, --age, --position, --dev-trait")),
            };
            print_json(&result, &config)?;
        }
        Commands::Pick { round, years_out, projected } => {
            let descriptor = PickDescriptor::new(round, years_out, projected)?;
            let valuation = service.value_pick(franchise, &descriptor).await?;
            print_json(&valuation, &config)?;
        }
        Commands::Chart { round } => {
            let chart: Vec<_> =
                service.pick_chart().into_iter().filter(|row| round.map_or(true, |r| row.round == r)).collect();
            print_json(&chart, &config)?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                print_json(&service.settings(franchise).await?, &config)?;
            }
            SettingsAction::Patch { patch } => {
                let record = service.patch_settings(franchise, &read_body(&patch)?).await?;
                print_json(&record, &config)?;
            }
            SettingsAction::Seed { reset } => {
                print_json(&service.seed_default(reset).await?, &config)?;
            }
        },
    }

    Ok(())
}
