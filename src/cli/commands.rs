//! CLI command definitions using clap
//!
//! Defines all CLI subcommands and their arguments.

use clap::{Parser, Subcommand};

use crate::auth::TokenOptions;

/// Gateway serving database-defined REST endpoints as MCP tools.
///
/// Reads the tool catalog from Supabase at startup, generates an OpenAPI
/// document from it, and serves the resulting tools over MCP behind
/// bearer-token authentication.
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server over streamable HTTP
    Serve(ServeArgs),

    /// Print the generated OpenAPI document
    Spec(SpecArgs),

    /// Mint a bearer token without starting the server
    Token(TokenArgs),
}

/// Arguments for the `serve` subcommand
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen port (overrides the PORT environment variable)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `spec` subcommand
#[derive(Parser, Debug)]
pub struct SpecArgs {
    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the `token` subcommand
#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// Subject claim (usually a user or client id)
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Issuer claim
    #[arg(long)]
    pub issuer: Option<String>,

    /// Audience claim
    #[arg(long)]
    pub audience: Option<String>,

    /// Scope to include (repeatable)
    #[arg(short = 'S', long = "scope")]
    pub scopes: Vec<String>,

    /// Token lifetime in seconds
    #[arg(short, long, default_value = "3600")]
    pub expires_in: u64,
}

impl TokenArgs {
    /// Convert CLI arguments to minting options
    pub fn to_options(&self) -> TokenOptions {
        let defaults = TokenOptions::default();
        TokenOptions {
            subject: self.subject.clone().unwrap_or(defaults.subject),
            issuer: self.issuer.clone().unwrap_or(defaults.issuer),
            audience: self.audience.clone(),
            scopes: self.scopes.clone(),
            expires_in_secs: self.expires_in,
        }
    }
}
