//! CLI module for toolgate
//!
//! Provides command-line interface with the following subcommands:
//! - `serve` - Start the MCP server over streamable HTTP
//! - `spec` - Print the generated OpenAPI document
//! - `token` - Mint a bearer token without starting the server

pub mod commands;
pub mod serve;

pub use commands::{Cli, Commands};
pub use serve::run_server;
