//! OpenAPI spec builder
//!
//! Turns the rows fetched from Supabase into an OpenAPI 3.0 document:
//! one path item per distinct endpoint path, one operation per HTTP verb.
//!
//! A parameter is classified at build time:
//! - its name appears as a `{placeholder}` in the path → path parameter
//!   (always required);
//! - otherwise, for GET endpoints → query parameter;
//! - otherwise → property of a JSON object request body.
//!
//! Tools whose endpoint cannot be resolved are skipped with a warning,
//! never a hard failure.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::db::{EndpointRow, ParameterRow, ToolRow};

/// Valid JSON schema primitive types; anything else falls back to "string"
const JSON_SCHEMA_TYPES: &[&str] = &["string", "number", "integer", "boolean", "array", "object"];

/// A generated OpenAPI 3.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: Info,
    pub paths: BTreeMap<String, PathItem>,
}

/// Operations on one path, keyed by lowercased HTTP verb
pub type PathItem = BTreeMap<String, Operation>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// One operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(default)]
    pub parameters: Vec<ParameterObject>,
    #[serde(
        rename = "requestBody",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, ResponseObject>,
}

/// A path or query parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

/// A JSON schema fragment for a single value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: ObjectSchema,
}

/// JSON object schema used for request bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, Schema>,
    pub required: Vec<String>,
}

impl OpenApiSpec {
    /// Total number of operations across all paths
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.len()).sum()
    }
}

/// Build an OpenAPI 3.0 document from the fetched rows.
///
/// Every enabled tool must reference an existing endpoint; tools without a
/// resolvable endpoint are dropped with a diagnostic. No other validation
/// is performed.
pub fn build_spec(
    tools: &[ToolRow],
    endpoints: &[EndpointRow],
    parameters: &[ParameterRow],
) -> OpenApiSpec {
    let endpoint_map: HashMap<i64, &EndpointRow> =
        endpoints.iter().map(|e| (e.id, e)).collect();

    let mut params_map: HashMap<i64, Vec<&ParameterRow>> = HashMap::new();
    for param in parameters {
        params_map.entry(param.endpoint_id).or_default().push(param);
    }

    let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();

    for tool in tools {
        let endpoint = match tool.endpoint_id.and_then(|id| endpoint_map.get(&id)) {
            Some(endpoint) => *endpoint,
            None => {
                tracing::warn!(tool = %tool.tool_name, "Skipping tool (no endpoint found)");
                continue;
            }
        };

        let path = path_of(&endpoint.url);
        let method = endpoint.method.to_lowercase();

        let mut operation = Operation {
            summary: tool.tool_description.clone(),
            operation_id: tool.tool_name.clone(),
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::from([(
                "200".to_string(),
                ResponseObject {
                    description: "Successful Response".to_string(),
                },
            )]),
        };

        let mut body_properties: BTreeMap<String, Schema> = BTreeMap::new();
        let mut body_required: Vec<String> = Vec::new();

        for param in params_map.get(&endpoint.id).into_iter().flatten() {
            let schema_type = sanitize_type(&param.parameter_name, param.parameter_type.as_deref());

            if path.contains(&format!("{{{}}}", param.parameter_name)) {
                // Path parameters are always required
                operation.parameters.push(ParameterObject {
                    name: param.parameter_name.clone(),
                    location: ParameterLocation::Path,
                    required: true,
                    description: param.description.clone(),
                    schema: Schema {
                        schema_type,
                        description: None,
                    },
                });
            } else if method == "get" {
                operation.parameters.push(ParameterObject {
                    name: param.parameter_name.clone(),
                    location: ParameterLocation::Query,
                    required: param.is_required,
                    description: param.description.clone(),
                    schema: Schema {
                        schema_type,
                        description: None,
                    },
                });
            } else {
                body_properties.insert(
                    param.parameter_name.clone(),
                    Schema {
                        schema_type,
                        description: param.description.clone(),
                    },
                );
                if param.is_required {
                    body_required.push(param.parameter_name.clone());
                }
            }
        }

        if !body_properties.is_empty() {
            operation.request_body = Some(RequestBody {
                required: true,
                content: BTreeMap::from([(
                    "application/json".to_string(),
                    MediaType {
                        schema: ObjectSchema {
                            schema_type: "object".to_string(),
                            properties: body_properties,
                            required: body_required,
                        },
                    },
                )]),
            });
        }

        tracing::debug!(tool = %tool.tool_name, %path, %method, "Added tool to spec");
        paths.entry(path).or_default().insert(method, operation);
    }

    OpenApiSpec {
        openapi: "3.0.0".to_string(),
        info: Info {
            title: "Supabase Dynamic Tools".to_string(),
            version: "1.0.0".to_string(),
        },
        paths,
    }
}

/// Extract the path component of an endpoint URL.
///
/// Endpoint URLs may be absolute ("https://host/api/x") or already relative
/// ("/api/x"); both resolve to "/api/x".
fn path_of(url: &str) -> String {
    if url.starts_with('/') {
        return url.to_string();
    }
    match Url::parse(url) {
        // Url percent-encodes braces; decode them so `{placeholder}`
        // segments stay recognizable as path parameters.
        Ok(parsed) => parsed.path().replace("%7B", "{").replace("%7D", "}"),
        Err(_) => format!("/{}", url.trim_start_matches('/')),
    }
}

/// Lowercase a declared parameter type, falling back to "string" for
/// anything outside the JSON schema primitive set.
fn sanitize_type(name: &str, raw: Option<&str>) -> String {
    let lowered = raw.unwrap_or("string").to_lowercase();
    if JSON_SCHEMA_TYPES.contains(&lowered.as_str()) {
        lowered
    } else {
        tracing::warn!(
            parameter = %name,
            declared = %lowered,
            "Invalid parameter type, defaulting to 'string'"
        );
        "string".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseObject {
    pub description: String,
}
