//! Supabase access layer
//!
//! Fetches the tool catalog from three related tables over the Supabase
//! REST (PostgREST) interface: `mcp_tools`, `api_endpoints`, and
//! `endpoint_parameters`. Rows are fetched once, sequentially, at startup.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Settings;
use crate::error::GatewayError;

/// One row of `mcp_tools`: a callable operation
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRow {
    pub id: i64,
    pub tool_name: String,
    #[serde(default)]
    pub tool_description: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub endpoint_id: Option<i64>,
}

/// One row of `api_endpoints`: the HTTP binding for a tool
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointRow {
    pub id: i64,
    pub url: String,
    pub method: String,
}

/// One row of `endpoint_parameters`: an argument for an endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterRow {
    pub endpoint_id: i64,
    pub parameter_name: String,
    #[serde(default)]
    pub parameter_type: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// The three row sets the OpenAPI builder consumes
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tools: Vec<ToolRow>,
    pub endpoints: Vec<EndpointRow>,
    pub parameters: Vec<ParameterRow>,
}

/// Thin client for the Supabase REST interface
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl SupabaseClient {
    /// Create a client from validated settings
    pub fn new(settings: &Settings) -> Self {
        Self::with_base_url(&settings.supabase_url, &settings.supabase_key)
    }

    /// Create a client against an explicit base URL (used by tests)
    pub fn with_base_url(base_url: &str, key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    /// Run a `select=*` query against one table
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<T>, GatewayError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);

        let mut query: Vec<(&str, &str)> = vec![("select", "*")];
        query.extend_from_slice(filters);

        let response = self
            .http
            .get(&url)
            .query(&query)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await
            .map_err(|source| GatewayError::Supabase {
                table: table.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::SupabaseStatus {
                table: table.to_string(),
                status,
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| GatewayError::Supabase {
                table: table.to_string(),
                source,
            })
    }

    /// Fetch all enabled tools
    pub async fn fetch_tools(&self) -> Result<Vec<ToolRow>, GatewayError> {
        self.select("mcp_tools", &[("is_enabled", "eq.true")]).await
    }

    /// Fetch all endpoint definitions
    pub async fn fetch_endpoints(&self) -> Result<Vec<EndpointRow>, GatewayError> {
        self.select("api_endpoints", &[]).await
    }

    /// Fetch all endpoint parameters
    pub async fn fetch_parameters(&self) -> Result<Vec<ParameterRow>, GatewayError> {
        self.select("endpoint_parameters", &[]).await
    }

    /// Fetch the full tool catalog in one pass.
    ///
    /// Tables are queried sequentially; any failure is fatal. An empty
    /// `mcp_tools` result is legal but logged, since it produces a server
    /// with no tools.
    pub async fn fetch_catalog(&self) -> Result<Catalog, GatewayError> {
        tracing::info!("Connecting to Supabase to fetch tools");

        let tools = self.fetch_tools().await?;
        if tools.is_empty() {
            tracing::warn!("No enabled tools found in 'mcp_tools' table");
        }

        let endpoints = self.fetch_endpoints().await?;
        let parameters = self.fetch_parameters().await?;

        tracing::info!(
            tools = tools.len(),
            endpoints = endpoints.len(),
            parameters = parameters.len(),
            "Fetched tool catalog"
        );

        Ok(Catalog {
            tools,
            endpoints,
            parameters,
        })
    }
}
