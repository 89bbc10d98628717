//! GifScout command line client.
//!
//! Run with: `gifscout <command>`
//!
//! Results are written to stdout as JSON; diagnostics go through `tracing`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::ExitCode;

use anyhow::Context as _;
use gifscout_infra::config;
use gifscout_infra::observability::{self, LogFormat};
use tracing::{info, warn};

mod commands;
mod context;

use commands::Command;
use context::AppContext;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Could not load .env file: {e}");
        }
    }

    let format = match env::var("GIFSCOUT_LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Text,
    };
    observability::init(format);

    match run(env::args().skip(1).collect()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gifscout: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let command = Command::parse(args)?;
    if command == Command::Help {
        print_help();
        return Ok(());
    }

    let config = config::load().context("failed to load configuration")?;
    let ctx = AppContext::new(config)?;
    info!(base_uri = %ctx.config.api.base_uri, "gifscout starting");

    match ctx.resume().await {
        Ok(0) => {}
        Ok(count) => info!(count, "resumed unfinished transactions"),
        Err(e) => warn!(error = %e, "could not resume transactions"),
    }

    let result = commands::run(&ctx, command).await;
    ctx.shutdown().await;

    let output = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_help() {
    println!("GifScout");
    println!();
    println!("USAGE:");
    println!("    gifscout <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    search <query> [page]   Search GIFs, 25 per page (page defaults to 1)");
    println!("    pending                 List unfinished transactions");
    println!("    purge                   Delete completed transactions");
    println!("    help                    Show this message");
    println!();
    println!("Configuration is read from GIFSCOUT_* environment variables or a");
    println!("config.{{json,toml}} / gifscout.{{json,toml}} file.");
}
