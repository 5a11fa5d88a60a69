//! MCP server launcher
//!
//! Starts the MCP server over streamable HTTP. Startup is strict: the tool
//! catalog is fetched and the keypair resolved before the listener binds,
//! so a misconfigured process dies immediately instead of serving nothing.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any_service,
    Router,
};
use colored::Colorize;
use rmcp::transport::{
    streamable_http_server::{session::local::LocalSessionManager, StreamableHttpService},
    StreamableHttpServerConfig,
};

use crate::auth::{BearerValidator, KeyPair, TokenOptions, DEFAULT_ISSUER};
use crate::config::Settings;
use crate::db::SupabaseClient;
use crate::mcp::ToolgateServer;
use crate::openapi::build_spec;

/// State shared with the bearer middleware
#[derive(Clone)]
struct AuthState {
    validator: Arc<BearerValidator>,
}

/// Run the MCP server over streamable HTTP.
///
/// Loads settings from the environment, fetches the tool catalog from
/// Supabase, generates the OpenAPI document, mints a bearer token for this
/// session (printed to stdout), and serves the routed tools at `/mcp`.
///
/// # Arguments
/// * `port_override` - Optional listen port overriding the PORT variable
pub async fn run_server(port_override: Option<u16>) -> Result<()> {
    let settings = Settings::from_env().context("Failed to load configuration")?;
    let base_url = settings.require_tool_api_base_url()?.to_string();

    let catalog = SupabaseClient::new(&settings)
        .fetch_catalog()
        .await
        .context("Failed to fetch tool catalog from Supabase")?;
    let spec = build_spec(&catalog.tools, &catalog.endpoints, &catalog.parameters);

    let keypair = KeyPair::from_settings(&settings)?;
    let token = keypair.mint_token(&TokenOptions::default())?;
    let validator = BearerValidator::new(&keypair.public_pem, Some(DEFAULT_ISSUER), None)?;

    let server = ToolgateServer::new(&spec, &base_url, settings.subscription_key.clone());

    // The token goes to stdout so callers can capture it; everything else
    // the process prints goes to stderr.
    println!("{}", "Bearer token for this session:".green().bold());
    println!("{token}");
    println!();
    println!("Export it as FASTMCP_ACCESS_TOKEN for MCP clients.");

    let mcp_service: StreamableHttpService<ToolgateServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(server.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig::default(),
        );

    let auth_state = AuthState {
        validator: Arc::new(validator),
    };

    let app = Router::new()
        .route("/mcp", any_service(mcp_service))
        .layer(middleware::from_fn_with_state(
            auth_state,
            require_bearer_middleware,
        ))
        .layer(middleware::from_fn(log_request));

    let port = port_override.unwrap_or(settings.port);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "MCP server listening at /mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Bearer auth middleware - only protects /mcp paths
async fn require_bearer_middleware(
    State(auth_state): State<AuthState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with("/mcp") {
        return next.run(request).await;
    }

    let www_authenticate = r#"Bearer realm="toolgate""#;

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token.and_then(|t| auth_state.validator.validate(t)) {
        Some(claims) => {
            tracing::debug!(subject = %claims.sub, "Authenticated request");
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, www_authenticate)],
        )
            .into_response(),
    }
}

/// Request logging middleware
async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    tracing::info!(%method, %uri, status = %response.status(), "Handled request");
    response
}
