//! MCP server module
//!
//! Derives the tool routing table from the generated OpenAPI document and
//! serves it over MCP, proxying each call to the backing REST API.

pub mod router;
pub mod server;

pub use router::{tools_from_spec, HttpTool, ParamLocation, ToolParam};
pub use server::ToolgateServer;
