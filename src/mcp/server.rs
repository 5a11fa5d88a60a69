//! MCP server implementation
//!
//! Serves the routed tool table over MCP using the rmcp SDK. Tools are
//! dynamic (one per database-defined operation), so `list_tools` and
//! `call_tool` are implemented directly instead of through the static tool
//! macros. Each call is proxied as an HTTP request to the tool API.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::mcp::router::{HttpTool, ParamLocation};
use crate::openapi::OpenApiSpec;

/// Response from a proxied tool call
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: String,
}

struct Inner {
    tools: Vec<HttpTool>,
    http: reqwest::Client,
    base_url: String,
    subscription_key: Option<String>,
}

/// MCP server proxying database-defined tools to their REST endpoints
#[derive(Clone)]
pub struct ToolgateServer {
    inner: Arc<Inner>,
}

impl ToolgateServer {
    /// Build a server from a generated OpenAPI document.
    ///
    /// `base_url` is the origin proxied calls are sent to; the path from
    /// each operation is appended to it. `subscription_key`, when present,
    /// is forwarded as the `Ocp-Apim-Subscription-Key` header.
    pub fn new(spec: &OpenApiSpec, base_url: &str, subscription_key: Option<String>) -> Self {
        let tools = crate::mcp::router::tools_from_spec(spec);
        tracing::info!(tools = tools.len(), %base_url, "Routed tool table built");

        Self {
            inner: Arc::new(Inner {
                tools,
                http: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                subscription_key,
            }),
        }
    }

    /// The routed tool table
    pub fn tools(&self) -> &[HttpTool] {
        &self.inner.tools
    }

    fn find_tool(&self, name: &str) -> Option<&HttpTool> {
        self.inner.tools.iter().find(|t| t.name == name)
    }

    /// Execute one tool call against the backing API.
    ///
    /// Path parameters are substituted into the template, query parameters
    /// attached for GET, and everything else goes into a JSON body. Upstream
    /// status codes are returned as data, not mapped to errors.
    pub async fn execute_tool(
        &self,
        tool: &HttpTool,
        args: &Map<String, Value>,
    ) -> Result<ProxyResponse, GatewayError> {
        let mut path = tool.path.clone();
        for param in tool.params_at(ParamLocation::Path) {
            let value = args
                .get(&param.name)
                .filter(|v| !v.is_null())
                .ok_or_else(|| GatewayError::MissingArgument {
                    tool: tool.name.clone(),
                    argument: param.name.clone(),
                })?;
            path = path.replace(&format!("{{{}}}", param.name), &scalar_to_string(value));
        }

        let mut query: Vec<(String, String)> = Vec::new();
        for param in tool.params_at(ParamLocation::Query) {
            match args.get(&param.name).filter(|v| !v.is_null()) {
                Some(value) => query.push((param.name.clone(), scalar_to_string(value))),
                None if param.required => {
                    return Err(GatewayError::MissingArgument {
                        tool: tool.name.clone(),
                        argument: param.name.clone(),
                    })
                }
                None => {}
            }
        }

        let mut body = Map::new();
        for param in tool.params_at(ParamLocation::Body) {
            match args.get(&param.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    body.insert(param.name.clone(), value.clone());
                }
                None if param.required => {
                    return Err(GatewayError::MissingArgument {
                        tool: tool.name.clone(),
                        argument: param.name.clone(),
                    })
                }
                None => {}
            }
        }

        let method = Method::from_bytes(tool.method.as_bytes()).map_err(|_| {
            GatewayError::InvalidEndpoint(format!("'{}' is not an HTTP method", tool.method))
        })?;
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!(tool = %tool.name, %url, method = %method, "Proxying tool call");

        let mut request = self.inner.http.request(method, &url).query(&query);
        if let Some(ref key) = self.inner.subscription_key {
            request = request.header("Ocp-Apim-Subscription-Key", key);
        }
        if !body.is_empty() {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(ProxyResponse { status, body })
    }
}

/// Render a scalar argument for use in a path segment or query string
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ServerHandler for ToolgateServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "toolgate".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Gateway exposing database-defined REST endpoints as tools. \
                 Each tool proxies one HTTP operation; arguments are merged \
                 into path, query, and body as declared by its schema."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self
            .inner
            .tools
            .iter()
            .map(|tool| {
                Tool::new(
                    tool.name.clone(),
                    tool.description.clone().unwrap_or_default(),
                    Arc::new(tool.input_schema()),
                )
            })
            .collect();

        Ok(ListToolsResult {
            next_cursor: None,
            tools,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.find_tool(&request.name).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown tool '{}'", request.name), None)
        })?;
        let args = request.arguments.unwrap_or_default();

        match self.execute_tool(tool, &args).await {
            Ok(response) if response.status.is_success() => {
                Ok(CallToolResult::success(vec![Content::text(response.body)]))
            }
            Ok(response) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Upstream returned {}: {}",
                response.status, response.body
            ))])),
            Err(err @ GatewayError::MissingArgument { .. }) => {
                Err(McpError::invalid_params(err.to_string(), None))
            }
            Err(err) => {
                tracing::error!(tool = %tool.name, error = %err, "Tool call failed");
                Err(McpError::internal_error(err.to_string(), None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{EndpointRow, ParameterRow, ToolRow};
    use crate::openapi::build_spec;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spec_with(endpoint_url: &str, http_method: &str, params: Vec<ParameterRow>) -> OpenApiSpec {
        let tools = vec![ToolRow {
            id: 1,
            tool_name: "the_tool".to_string(),
            tool_description: Some("A tool".to_string()),
            is_enabled: true,
            endpoint_id: Some(10),
        }];
        let endpoints = vec![EndpointRow {
            id: 10,
            url: endpoint_url.to_string(),
            method: http_method.to_string(),
        }];
        build_spec(&tools, &endpoints, &params)
    }

    fn param(name: &str, ty: &str, required: bool) -> ParameterRow {
        ParameterRow {
            endpoint_id: 10,
            parameter_name: name.to_string(),
            parameter_type: Some(ty.to_string()),
            is_required: required,
            description: None,
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_get_call_substitutes_path_and_query() {
        let upstream = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/things/5"))
            .and(query_param("verbose", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_string("found it"))
            .mount(&upstream)
            .await;

        let spec = spec_with(
            "/v1/things/{thingId}",
            "GET",
            vec![param("thingId", "integer", true), param("verbose", "boolean", false)],
        );
        let server = ToolgateServer::new(&spec, &upstream.uri(), None);
        let tool = &server.tools()[0];

        let response = server
            .execute_tool(tool, &args(json!({"thingId": 5, "verbose": true})))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "found it");
    }

    #[tokio::test]
    async fn test_post_call_sends_json_body_and_subscription_header() {
        let upstream = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/things"))
            .and(header("Ocp-Apim-Subscription-Key", "sub-key"))
            .and(body_json(json!({"name": "widget"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&upstream)
            .await;

        let spec = spec_with("/v1/things", "POST", vec![param("name", "string", true)]);
        let server = ToolgateServer::new(&spec, &upstream.uri(), Some("sub-key".to_string()));
        let tool = &server.tools()[0];

        let response = server
            .execute_tool(tool, &args(json!({"name": "widget"})))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, "created");
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_an_error() {
        let spec = spec_with("/v1/things/{thingId}", "GET", vec![param("thingId", "integer", true)]);
        let server = ToolgateServer::new(&spec, "http://127.0.0.1:9", None);
        let tool = &server.tools()[0];

        let err = server.execute_tool(tool, &Map::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingArgument { .. }));
        assert!(err.to_string().contains("thingId"));
    }

    #[tokio::test]
    async fn test_optional_query_argument_omitted() {
        let upstream = MockServer::start().await;

        // No verbose parameter: the query string must stay empty
        Mock::given(method("GET"))
            .and(path("/v1/things"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&upstream)
            .await;

        let spec = spec_with("/v1/things", "GET", vec![param("verbose", "boolean", false)]);
        let server = ToolgateServer::new(&spec, &upstream.uri(), None);
        let tool = &server.tools()[0];

        let response = server.execute_tool(tool, &Map::new()).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_returned_as_data() {
        let upstream = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/things"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&upstream)
            .await;

        let spec = spec_with("/v1/things", "GET", vec![]);
        let server = ToolgateServer::new(&spec, &upstream.uri(), None);
        let tool = &server.tools()[0];

        let response = server.execute_tool(tool, &Map::new()).await.unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, "boom");
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("abc")), "abc");
        assert_eq!(scalar_to_string(&json!(5)), "5");
        assert_eq!(scalar_to_string(&json!(true)), "true");
    }

    #[test]
    fn test_server_info_advertises_tools() {
        let spec = spec_with("/v1/things", "GET", vec![]);
        let server = ToolgateServer::new(&spec, "http://localhost", None);
        let info = server.get_info();

        assert_eq!(info.server_info.name, "toolgate");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }
}
