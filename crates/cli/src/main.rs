//! House Price Predictor CLI
//!
//! A command-line client for requesting price predictions and
//! inspecting the prediction server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{predict, status};

/// House Price Predictor CLI
#[derive(Parser)]
#[command(name = "hpp")]
#[command(author, version, about = "CLI for the House Price Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via HPP_API_URL env var)
    #[arg(long, env = "HPP_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the market price of a house
    Predict(PredictArgs),

    /// Show the feature columns of the loaded model
    Schema,

    /// Show server health and readiness
    Health,

    /// Save default settings to the config file
    Configure {
        /// API endpoint URL to store
        #[arg(long)]
        api_url: Option<String>,

        /// Default currency to store (USD or INR)
        #[arg(long)]
        currency: Option<String>,
    },
}

#[derive(Args)]
pub struct PredictArgs {
    /// Number of bedrooms
    #[arg(long)]
    pub bedrooms: u32,

    /// Number of bathrooms
    #[arg(long)]
    pub bathrooms: u32,

    /// Living area in square feet
    #[arg(long)]
    pub sqft: u32,

    /// Number of floors (e.g. 1, 1.5, 2)
    #[arg(long)]
    pub floors: f64,

    /// Age of the house in years
    #[arg(long)]
    pub age: u32,

    /// House has a waterfront view
    #[arg(long)]
    pub waterfront: bool,

    /// House has a garage
    #[arg(long)]
    pub garage: bool,

    /// House has a garden
    #[arg(long)]
    pub garden: bool,

    /// Location (e.g. Suburb, City Center, Rural)
    #[arg(long)]
    pub location: String,

    /// Output currency (USD or INR)
    #[arg(long)]
    pub currency: Option<String>,
}

impl PredictArgs {
    fn into_request(self, default_currency: Option<String>) -> client::PredictRequest {
        client::PredictRequest {
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            sqft: self.sqft,
            floors: self.floors,
            age: self.age,
            waterfront: self.waterfront,
            garage: self.garage,
            garden: self.garden,
            location: self.location,
            currency: self.currency.or(default_currency),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::Config::load()?;

    let api_url = settings.resolve_api_url(cli.api_url.as_deref());

    // Execute command
    match cli.command {
        Commands::Predict(args) => {
            let client = client::ApiClient::new(&api_url)?;
            let request = args.into_request(settings.default_currency);
            predict::predict(&client, &request, cli.format, cli.verbose).await?;
        }
        Commands::Schema => {
            let client = client::ApiClient::new(&api_url)?;
            status::show_schema(&client, cli.format).await?;
        }
        Commands::Health => {
            let client = client::ApiClient::new(&api_url)?;
            status::show_health(&client, cli.format).await?;
        }
        Commands::Configure { api_url, currency } => {
            let updated = config::Config {
                api_url: api_url.or(settings.api_url),
                default_currency: currency.or(settings.default_currency),
            };
            let path = config::Config::config_path()?;
            updated.save_to(&path)?;
            output::print_success(&format!("Saved settings to {}", path.display()));
        }
    }

    Ok(())
}
