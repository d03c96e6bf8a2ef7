//! CLI for the GCM push client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gcm_core::config;
use serde_json::{Map, Value};

use commands::{run_backoff, run_config, run_send, SendArgs};

/// Top-level CLI for the GCM push client.
#[derive(Debug, Parser)]
#[command(name = "gcm")]
#[command(about = "gcm: send push notifications through GCM/FCM", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send one message and print the classified result. Never retries.
    Send {
        /// Server API key (falls back to `api_key` in config.toml).
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Target registration id. Repeat for a multicast send.
        #[arg(short = 'r', long = "registration-id", required = true)]
        registration_ids: Vec<String>,

        /// JSON object sent as the message data payload.
        #[arg(short = 'd', long, value_parser = parse_json_object)]
        data: Option<Map<String, Value>>,

        /// Notification title.
        #[arg(short = 't', long)]
        message_title: Option<String>,

        /// Notification body.
        #[arg(short = 'b', long)]
        message_body: Option<String>,

        /// Gateway endpoint (overrides config).
        #[arg(long)]
        url: Option<String>,

        /// Use the URL-encoded plain-text form (single recipient, no notification).
        #[arg(long)]
        plain_text: bool,

        /// Ask the gateway to validate without delivering.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the backoff schedule for a given initial window.
    Backoff {
        /// Initial backoff in milliseconds (defaults to config).
        #[arg(long, value_name = "MS")]
        initial_ms: Option<u64>,

        /// Number of retry attempts to show.
        #[arg(long, default_value = "5", value_name = "N")]
        attempts: u32,

        /// Seed for reproducible jitter.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the config file path and effective settings.
    Config,
}

fn parse_json_object(s: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("data must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!(url = %cfg.url, initial_backoff_ms = cfg.initial_backoff_ms, "loaded config");

        match cli.command {
            CliCommand::Send {
                api_key,
                registration_ids,
                data,
                message_title,
                message_body,
                url,
                plain_text,
                dry_run,
            } => {
                let args = SendArgs {
                    api_key,
                    registration_ids,
                    data,
                    message_title,
                    message_body,
                    url,
                    plain_text,
                    dry_run,
                };
                run_send(&cfg, args).await?
            }
            CliCommand::Backoff {
                initial_ms,
                attempts,
                seed,
            } => run_backoff(&cfg, initial_ms, attempts, seed)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
