//! toolgate - Supabase-backed dynamic MCP tool gateway
//!
//! Turns rows in a Supabase project into callable MCP tools:
//! - **`mcp_tools`** - one row per tool, pointing at an endpoint
//! - **`api_endpoints`** - the HTTP binding (URL template and method)
//! - **`endpoint_parameters`** - typed arguments for each endpoint
//!
//! ## Pipeline
//!
//! At startup the catalog is fetched once, compiled into an OpenAPI 3.0
//! document (parameters partitioned into path, query, and body), and the
//! resulting operations are served over MCP via streamable HTTP. Each tool
//! call is proxied to the backing REST API.
//!
//! ## Authentication
//!
//! The server signs an RS256 bearer token at startup (printed to stdout)
//! and validates every `/mcp` request against the corresponding public key.

pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod openapi;

pub use auth::{AccessClaims, BearerValidator, KeyPair, TokenOptions};
pub use cli::{Cli, Commands};
pub use config::Settings;
pub use db::{Catalog, EndpointRow, ParameterRow, SupabaseClient, ToolRow};
pub use error::GatewayError;
pub use mcp::ToolgateServer;
pub use openapi::{build_spec, OpenApiSpec};
