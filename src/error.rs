//! Error types for toolgate
//!
//! Library code returns `GatewayError`; the binary wraps it in `anyhow`
//! at the CLI seam.

use thiserror::Error;

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Required environment variable missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Supabase request could not be sent
    #[error("Supabase request failed for table '{table}': {source}")]
    Supabase {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    /// Supabase answered with a non-success status
    #[error("Supabase returned {status} for table '{table}'")]
    SupabaseStatus {
        table: String,
        status: reqwest::StatusCode,
    },

    /// Tool API request failed before a response was received
    #[error("Tool API request failed: {0}")]
    Proxy(#[from] reqwest::Error),

    /// Endpoint URL or method could not be interpreted
    #[error("Invalid endpoint definition: {0}")]
    InvalidEndpoint(String),

    /// Tool call omitted a required argument
    #[error("Missing required argument '{argument}' for tool '{tool}'")]
    MissingArgument { tool: String, argument: String },

    /// RSA key generation or PEM encoding failed
    #[error("Key material error: {0}")]
    Key(String),

    /// JWT signing failed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
