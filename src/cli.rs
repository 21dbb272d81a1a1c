//! # secretctl
//!
//! Command-line interface for reading and writing AWS Secrets Manager secrets
//! through the cached secret handler.
//!
//! ## Usage
//!
//! ```bash
//! # Print the decoded value of the current version
//! secretctl get my-secret
//!
//! # Print the full record of a specific stage
//! secretctl get my-secret --version-stage AWSPREVIOUS --full
//!
//! # Replace the value, keeping its string/binary encoding
//! secretctl put my-secret --value '{"password":"rotated"}'
//! ```

use anyhow::{Context, Result};
use aws_secret_handler::observability::{self, metrics};
use aws_secret_handler::{HandlerConfig, SecretHandler, SecretValue, SecretsManager};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

/// AWS Secrets Manager CLI
#[derive(Parser, Debug)]
#[command(name = "secretctl")]
#[command(about = "Read and write AWS Secrets Manager secrets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// AWS region (defaults to AWS_REGION, then us-east-1)
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Secrets Manager endpoint override (e.g. http://localhost:4566)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Print Prometheus metrics after the command completes
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a secret value
    Get {
        #[command(flatten)]
        secret: SecretArgs,

        /// Print the full record instead of the decoded value
        #[arg(long)]
        full: bool,
    },
    /// Replace a secret value
    Put {
        #[command(flatten)]
        secret: SecretArgs,

        /// New value as a JSON object or array
        #[arg(short = 'V', long)]
        value: String,
    },
}

#[derive(Args, Debug)]
struct SecretArgs {
    /// Secret name or ARN
    name: String,

    /// Version id to read or write
    #[arg(long)]
    version_id: Option<String>,

    /// Version stage to read or write (e.g. AWSCURRENT, AWSPREVIOUS)
    #[arg(long)]
    version_stage: Option<String>,
}

impl SecretArgs {
    fn handler(&self, manager: &SecretsManager) -> std::sync::Arc<SecretHandler> {
        let handler = manager.secret(&self.name);
        handler
            .set_version_id(self.version_id.clone().unwrap_or_default())
            .set_version_stage(self.version_stage.clone().unwrap_or_default());
        handler
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing(None);
    metrics::register_metrics().context("Failed to register metrics")?;

    let cli = Cli::parse();

    let config = HandlerConfig::from_env()
        .with_region(cli.region)
        .with_endpoint_url(cli.endpoint);
    let manager = SecretsManager::from_config(&config).await;

    match cli.command {
        Commands::Get { secret, full } => get_command(&manager, &secret, full).await?,
        Commands::Put { secret, value } => put_command(&manager, &secret, &value).await?,
    }

    if cli.metrics {
        print!(
            "{}",
            metrics::gather_metrics().context("Failed to render metrics")?
        );
    }

    Ok(())
}

/// Print the decoded value, or the raw record with `--full`
async fn get_command(manager: &SecretsManager, secret: &SecretArgs, full: bool) -> Result<()> {
    let handler = secret.handler(manager);

    if full {
        let record = handler
            .get_value_data()
            .await
            .with_context(|| format!("Failed to get secret '{}'", secret.name))?;
        print_json(&*record)
    } else {
        let value = handler
            .get_value()
            .await
            .with_context(|| format!("Failed to get secret '{}'", secret.name))?;
        match value {
            SecretValue::Json(json) => print_json(&json),
            SecretValue::Text(text) => {
                println!("{text}");
                Ok(())
            }
        }
    }
}

/// Replace the value and print the store's confirmation
async fn put_command(manager: &SecretsManager, secret: &SecretArgs, value: &str) -> Result<()> {
    let new_secret: serde_json::Value =
        serde_json::from_str(value).context("--value must be valid JSON")?;

    let confirmation = secret
        .handler(manager)
        .update_value(&new_secret)
        .await
        .with_context(|| format!("Failed to update secret '{}'", secret.name))?;

    print_json(&confirmation)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}
