//! Configuration for toolgate
//!
//! All configuration comes from environment variables, read once at startup:
//!
//! | Variable                    | Required | Purpose                                  |
//! |-----------------------------|----------|------------------------------------------|
//! | `SUPABASE_URL`              | yes      | Base URL of the Supabase project         |
//! | `SUPABASE_KEY`              | yes      | Service role / anon key                  |
//! | `TOOL_API_BASE_URL`         | serve    | Base URL proxied tool calls are sent to  |
//! | `OCP_APIM_SUBSCRIPTION_KEY` | no       | Azure APIM subscription header value     |
//! | `FASTMCP_PRIVATE_KEY`       | no       | RSA private key PEM for token signing    |
//! | `FASTMCP_PUBLIC_KEY`        | no       | RSA public key PEM for token validation  |
//! | `PORT`                      | no       | HTTP listen port (default 8000)          |

use figment::{providers::Env, Figment};
use serde::Deserialize;

use crate::error::GatewayError;

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Environment variables the gateway reads
const ENV_KEYS: &[&str] = &[
    "SUPABASE_URL",
    "SUPABASE_KEY",
    "TOOL_API_BASE_URL",
    "OCP_APIM_SUBSCRIPTION_KEY",
    "FASTMCP_PRIVATE_KEY",
    "FASTMCP_PUBLIC_KEY",
    "PORT",
];

/// Raw view of the environment before validation
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    supabase_url: Option<String>,
    supabase_key: Option<String>,
    tool_api_base_url: Option<String>,
    ocp_apim_subscription_key: Option<String>,
    fastmcp_private_key: Option<String>,
    fastmcp_public_key: Option<String>,
    port: Option<u16>,
}

/// Validated runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Supabase project base URL
    pub supabase_url: String,
    /// Supabase API key, sent as both `apikey` and bearer credential
    pub supabase_key: String,
    /// Base URL for proxied tool API calls
    pub tool_api_base_url: Option<String>,
    /// Azure APIM subscription key forwarded on proxied calls
    pub subscription_key: Option<String>,
    /// RSA private key PEM (generated at startup when absent)
    pub private_key_pem: Option<String>,
    /// RSA public key PEM (generated at startup when absent)
    pub public_key_pem: Option<String>,
    /// HTTP listen port
    pub port: u16,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// Fails immediately when a required variable is missing (no partial
    /// startup, no defaults for credentials).
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_figment(Figment::new().merge(Env::raw().only(ENV_KEYS)))
    }

    /// Load settings from an explicit figment (used by tests)
    pub fn from_figment(figment: Figment) -> Result<Self, GatewayError> {
        let raw: RawSettings = figment
            .extract()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let (supabase_url, supabase_key) = match (raw.supabase_url, raw.supabase_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => (url, key),
            _ => {
                return Err(GatewayError::Config(
                    "SUPABASE_URL and SUPABASE_KEY environment variables must be set".to_string(),
                ))
            }
        };

        Ok(Settings {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_key,
            tool_api_base_url: raw
                .tool_api_base_url
                .map(|u| u.trim_end_matches('/').to_string()),
            subscription_key: raw.ocp_apim_subscription_key,
            private_key_pem: raw.fastmcp_private_key,
            public_key_pem: raw.fastmcp_public_key,
            port: raw.port.unwrap_or(DEFAULT_PORT),
        })
    }

    /// Base URL for proxied tool calls, required when serving
    pub fn require_tool_api_base_url(&self) -> Result<&str, GatewayError> {
        self.tool_api_base_url.as_deref().ok_or_else(|| {
            GatewayError::Config(
                "TOOL_API_BASE_URL environment variable must be set to serve tools".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;

    fn figment_with(pairs: &[(&str, &str)]) -> Figment {
        let mut figment = Figment::new();
        for (key, value) in pairs {
            // Parse values the way the Env provider does, so "9000"
            // becomes a number rather than a string.
            let value: figment::value::Value = value.parse().expect("infallible");
            figment = figment.merge(Serialized::default(key, value));
        }
        figment
    }

    #[test]
    fn test_minimal_settings() {
        let figment = figment_with(&[
            ("supabase_url", "https://example.supabase.co"),
            ("supabase_key", "service-role-key"),
        ]);

        let settings = Settings::from_figment(figment).unwrap();
        assert_eq!(settings.supabase_url, "https://example.supabase.co");
        assert_eq!(settings.supabase_key, "service-role-key");
        assert_eq!(settings.port, DEFAULT_PORT);
        assert!(settings.tool_api_base_url.is_none());
        assert!(settings.subscription_key.is_none());
    }

    #[test]
    fn test_missing_supabase_credentials() {
        let err = Settings::from_figment(Figment::new()).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn test_empty_supabase_key_rejected() {
        let figment = figment_with(&[
            ("supabase_url", "https://example.supabase.co"),
            ("supabase_key", ""),
        ]);
        assert!(Settings::from_figment(figment).is_err());
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let figment = figment_with(&[
            ("supabase_url", "https://example.supabase.co/"),
            ("supabase_key", "key"),
            ("tool_api_base_url", "https://api.example.com/"),
        ]);

        let settings = Settings::from_figment(figment).unwrap();
        assert_eq!(settings.supabase_url, "https://example.supabase.co");
        assert_eq!(
            settings.tool_api_base_url.as_deref(),
            Some("https://api.example.com")
        );
    }

    #[test]
    fn test_port_parsing() {
        let figment = figment_with(&[
            ("supabase_url", "https://example.supabase.co"),
            ("supabase_key", "key"),
            ("port", "9000"),
        ]);

        let settings = Settings::from_figment(figment).unwrap();
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn test_require_tool_api_base_url() {
        let figment = figment_with(&[
            ("supabase_url", "https://example.supabase.co"),
            ("supabase_key", "key"),
        ]);
        let settings = Settings::from_figment(figment).unwrap();
        assert!(settings.require_tool_api_base_url().is_err());
    }
}
