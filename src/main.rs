//! CBS adapter command-line client.
//!
//! Run with: `cbs-adapter --config config.yaml enquiry 123456789`

use anyhow::{Context, Result};
use cbs_adapter::msisdn::clean_msisdn_list;
use cbs_adapter::transport::{CorrelationIds, UuidCorrelationIds};
use cbs_adapter::{CbsClient, CbsConfig, CbsError};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Client for the CBS subscriber-management backend.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query lifecycle state and payment mode of a subscriber
    Enquiry {
        msisdn: String,
        /// Request ID (generated when omitted)
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Look up the customer name of a subscriber
    CustomerDetails {
        msisdn: String,
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Create a new subscriber
    CreateNumber {
        msisdn: String,
        agent_id: String,
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Clean a newline-separated MSISDN file
    CleanMsisdn { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let command = match args.command {
        Command::CleanMsisdn { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let cleaned = clean_msisdn_list(content.lines());
            info!(count = cleaned.len(), "MSISDN list cleaned");
            println!("{}", serde_json::to_string_pretty(&cleaned)?);
            return Ok(());
        }
        command => command,
    };

    info!("Config file: {}", args.config.display());
    let config = CbsConfig::load(&args.config).context("Failed to load config file")?;
    info!(endpoint = %config.endpoint, "Configuration loaded");

    let client = CbsClient::new(Arc::new(config)).context("Failed to create CBS client")?;
    let ids = UuidCorrelationIds;

    let result = match command {
        Command::Enquiry { msisdn, request_id } => {
            let request_id = request_id.unwrap_or_else(|| ids.next_id());
            client
                .enquiry(&request_id, &msisdn)
                .await
                .map(|info| json!(info))
        }
        Command::CustomerDetails { msisdn, request_id } => {
            let request_id = request_id.unwrap_or_else(|| ids.next_id());
            client
                .customer_details(&request_id, &msisdn)
                .await
                .map(|details| json!(details))
        }
        Command::CreateNumber {
            msisdn,
            agent_id,
            request_id,
        } => {
            let request_id = request_id.unwrap_or_else(|| ids.next_id());
            client
                .create_number(&request_id, &msisdn, &agent_id)
                .await
                .map(|()| json!({ "msisdn": msisdn, "created": true }))
        }
        Command::CleanMsisdn { .. } => return Ok(()),
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(CbsError::Classified(classified)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "error": classified.message,
                    "class": classified.class,
                    "status": classified.status_code(),
                    "system": classified.system,
                }))?
            );
            std::process::exit(1);
        }
        Err(e) => Err(e).context("CBS call failed"),
    }
}
