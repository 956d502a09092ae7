use std::io::Read;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};
use token_broker::config::file_to_config;
use token_broker::dispatch::request::empty_payload;
use token_broker::observability::render_metrics;
use token_broker::utils::constants::DEFAULT_CONFIG_PATH;
use token_broker::utils::logging::{self, LogLevel};
use token_broker::{into_uniform, serialize_json, HttpDispatcher};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    /// print prometheus metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load or acquire the token for the configured credentials
    Token,
    /// Call an API path and print the result as JSON
    Call {
        path: String,
        #[arg(short, long, default_value = "POST")]
        method: String,
        /// JSON payload, `{}` when omitted
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Print the legacy encoding of a JSON document (argument or stdin)
    Serialize {
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let output = match &args.command {
        Command::Serialize { data } => {
            logging::init_logging(&logging::resolve(None, args.log_level));
            let input = match data {
                Some(data) => data.to_owned(),
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let value: Value = serde_json::from_str(&input).context("input is not valid JSON")?;
            println!("{}", serialize_json(&value));
            return Ok(());
        }
        Command::Token => {
            let dispatcher = start(&args).await?;
            match dispatcher.tokens().initialize().await {
                Ok(token) => json!({"token": token.fingerprint()}),
                Err(err) => err.to_value(),
            }
        }
        Command::Call { path, method, data } => {
            let method: Method = method
                .to_uppercase()
                .parse()
                .map_err(|e| anyhow!("invalid method '{}': {}", method, e))?;
            let payload = match data {
                Some(data) => serde_json::from_str(data).context("--data is not valid JSON")?,
                None => empty_payload(),
            };
            let dispatcher = start(&args).await?;
            match dispatcher.tokens().initialize().await {
                Ok(_) => into_uniform(dispatcher.call(path, method, payload).await),
                Err(err) => err.to_value(),
            }
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    if args.metrics {
        eprintln!("{}", render_metrics().await?);
    }
    Ok(())
}

/// Loads the YAML config, initialises logging and wires transport, store and
/// token manager.
async fn start(args: &Args) -> Result<HttpDispatcher> {
    let config = file_to_config(std::path::Path::new(&args.config)).await?;
    logging::init_logging(&logging::resolve(config.logging.as_ref(), args.log_level));

    let dispatcher = HttpDispatcher::from_config(&config)?;
    info!("broker starting for client '{}'", dispatcher.tokens().credentials().client_id());
    Ok(dispatcher)
}
