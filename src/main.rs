//! toolgate CLI entry point
//!
//! Usage:
//!   toolgate serve           Start the MCP server over streamable HTTP
//!   toolgate spec            Print the generated OpenAPI document
//!   toolgate token           Mint a bearer token without serving

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use toolgate::auth::KeyPair;
use toolgate::cli::{
    commands::{SpecArgs, TokenArgs},
    run_server, Cli, Commands,
};
use toolgate::config::Settings;
use toolgate::db::SupabaseClient;
use toolgate::openapi::build_spec;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout is reserved for tokens and documents
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("toolgate={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => {
            run_server(args.port).await?;
        }
        Commands::Spec(args) => {
            print_spec(args).await?;
        }
        Commands::Token(args) => {
            print_token(args)?;
        }
    }

    Ok(())
}

/// Print the generated OpenAPI document to stdout
async fn print_spec(args: SpecArgs) -> Result<()> {
    let settings = Settings::from_env()?;
    let catalog = SupabaseClient::new(&settings).fetch_catalog().await?;
    let spec = build_spec(&catalog.tools, &catalog.endpoints, &catalog.parameters);

    let json = if args.compact {
        serde_json::to_string(&spec)?
    } else {
        serde_json::to_string_pretty(&spec)?
    };
    println!("{json}");

    Ok(())
}

/// Mint a bearer token and print it to stdout
fn print_token(args: TokenArgs) -> Result<()> {
    let settings = Settings::from_env()?;
    let keypair = KeyPair::from_settings(&settings)?;
    let token = keypair.mint_token(&args.to_options())?;
    println!("{token}");

    Ok(())
}
