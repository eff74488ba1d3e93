//! Job board prediction CLI
//!
//! A command-line tool for running predictions, listing loaded models
//! and checking the health of the prediction server, or inspecting a
//! model directory offline.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, models, predict};
use inference_lib::Task;
use std::path::PathBuf;

/// Job board prediction CLI
#[derive(Parser)]
#[command(name = "jbp")]
#[command(author, version, about = "CLI for the job board prediction service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via JBP_API_URL env var)
    #[arg(long, env = "JBP_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a prediction
    Predict {
        /// Task name (salary, remote_work, degree_mention, health_insurance,
        /// campaign_conversion, company_growth, revenue_growth, benefits, job_title)
        task: Task,

        /// Request field as key=value (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,

        /// Predict in-process instead of calling the server
        #[arg(long)]
        local: bool,

        /// Model directory for --local
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// List models and how they loaded
    Models {
        /// Load the model directory in-process instead of asking the server
        #[arg(long)]
        local: bool,

        /// Model directory for --local
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// Show server health
    Health,

    /// Inspect a model directory offline
    Inspect {
        /// Model directory to inspect
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| {
            settings
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_name)
        })
        .unwrap_or_default();

    // Execute command
    match cli.command {
        Commands::Predict {
            task,
            fields,
            local,
            model_dir,
        } => {
            let request = predict::build_request(&fields)?;
            let succeeded = if local {
                predict::predict_local(&settings.model_dir(model_dir), task, &request, format)?
            } else {
                let client = client::ApiClient::new(&settings.api_url(cli.api_url))?;
                predict::predict_remote(&client, task, &request, format).await?
            };
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Models { local, model_dir } => {
            if local {
                models::list_local_models(&settings.model_dir(model_dir), format)?;
            } else {
                let client = client::ApiClient::new(&settings.api_url(cli.api_url))?;
                models::list_models(&client, format).await?;
            }
        }
        Commands::Health => {
            let client = client::ApiClient::new(&settings.api_url(cli.api_url))?;
            health::show_health(&client, format).await?;
        }
        Commands::Inspect { model_dir } => {
            models::inspect(&settings.model_dir(model_dir), format)?;
        }
    }

    Ok(())
}
