//! OpenAPI operation → MCP tool routing table
//!
//! Each operation in the generated document becomes one `HttpTool`: the
//! routed form used to list the tool over MCP and to proxy calls to the
//! backing REST API. Path, query, and body parameters are merged into a
//! single JSON object input schema, since MCP tools take one argument
//! object.

use serde_json::{json, Map, Value};

use crate::openapi::{OpenApiSpec, ParameterLocation};

/// Where an argument ends up in the proxied HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

/// One argument of a routed tool
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: String,
    pub location: ParamLocation,
    pub schema_type: String,
    pub required: bool,
    pub description: Option<String>,
}

/// One callable tool routed to an HTTP operation
#[derive(Debug, Clone)]
pub struct HttpTool {
    /// Tool name (the operation's `operationId`)
    pub name: String,
    pub description: Option<String>,
    /// Uppercase HTTP verb
    pub method: String,
    /// Path template, possibly containing `{placeholder}` segments
    pub path: String,
    pub params: Vec<ToolParam>,
}

impl HttpTool {
    /// Arguments at one location
    pub fn params_at(&self, location: ParamLocation) -> impl Iterator<Item = &ToolParam> {
        self.params.iter().filter(move |p| p.location == location)
    }

    /// JSON object schema merging path, query, and body arguments
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut schema = Map::new();
            schema.insert("type".to_string(), json!(param.schema_type));
            if let Some(ref description) = param.description {
                schema.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(schema));

            if param.required {
                required.push(json!(param.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema
    }
}

/// Derive the tool routing table from a generated OpenAPI document
pub fn tools_from_spec(spec: &OpenApiSpec) -> Vec<HttpTool> {
    let mut tools = Vec::new();

    for (path, item) in &spec.paths {
        for (method, operation) in item {
            let mut params = Vec::new();

            for parameter in &operation.parameters {
                params.push(ToolParam {
                    name: parameter.name.clone(),
                    location: match parameter.location {
                        ParameterLocation::Path => ParamLocation::Path,
                        ParameterLocation::Query => ParamLocation::Query,
                    },
                    schema_type: parameter.schema.schema_type.clone(),
                    required: parameter.required,
                    description: parameter.description.clone(),
                });
            }

            if let Some(ref body) = operation.request_body {
                if let Some(media) = body.content.get("application/json") {
                    for (name, schema) in &media.schema.properties {
                        params.push(ToolParam {
                            name: name.clone(),
                            location: ParamLocation::Body,
                            schema_type: schema.schema_type.clone(),
                            required: media.schema.required.contains(name),
                            description: schema.description.clone(),
                        });
                    }
                }
            }

            tools.push(HttpTool {
                name: operation.operation_id.clone(),
                description: operation.summary.clone(),
                method: method.to_uppercase(),
                path: path.clone(),
                params,
            });
        }
    }

    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{EndpointRow, ParameterRow, ToolRow};
    use crate::openapi::build_spec;

    fn sample_spec() -> OpenApiSpec {
        let tools = vec![
            ToolRow {
                id: 1,
                tool_name: "get_thing".to_string(),
                tool_description: Some("Fetch one thing".to_string()),
                is_enabled: true,
                endpoint_id: Some(10),
            },
            ToolRow {
                id: 2,
                tool_name: "create_thing".to_string(),
                tool_description: None,
                is_enabled: true,
                endpoint_id: Some(11),
            },
        ];
        let endpoints = vec![
            EndpointRow {
                id: 10,
                url: "https://api.example.com/v1/things/{thingId}".to_string(),
                method: "GET".to_string(),
            },
            EndpointRow {
                id: 11,
                url: "https://api.example.com/v1/things".to_string(),
                method: "POST".to_string(),
            },
        ];
        let params = vec![
            ParameterRow {
                endpoint_id: 10,
                parameter_name: "thingId".to_string(),
                parameter_type: Some("integer".to_string()),
                is_required: true,
                description: None,
            },
            ParameterRow {
                endpoint_id: 10,
                parameter_name: "verbose".to_string(),
                parameter_type: Some("boolean".to_string()),
                is_required: false,
                description: None,
            },
            ParameterRow {
                endpoint_id: 11,
                parameter_name: "name".to_string(),
                parameter_type: Some("string".to_string()),
                is_required: true,
                description: Some("Display name".to_string()),
            },
        ];
        build_spec(&tools, &endpoints, &params)
    }

    #[test]
    fn test_tools_from_spec_covers_all_operations() {
        let tools = tools_from_spec(&sample_spec());
        assert_eq!(tools.len(), 2);

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"get_thing"));
        assert!(names.contains(&"create_thing"));
    }

    #[test]
    fn test_locations_follow_partitioning() {
        let tools = tools_from_spec(&sample_spec());
        let get = tools.iter().find(|t| t.name == "get_thing").unwrap();

        assert_eq!(get.method, "GET");
        assert_eq!(get.path, "/v1/things/{thingId}");
        assert_eq!(get.params_at(ParamLocation::Path).count(), 1);
        assert_eq!(get.params_at(ParamLocation::Query).count(), 1);
        assert_eq!(get.params_at(ParamLocation::Body).count(), 0);

        let create = tools.iter().find(|t| t.name == "create_thing").unwrap();
        assert_eq!(create.method, "POST");
        assert_eq!(create.params_at(ParamLocation::Body).count(), 1);
    }

    #[test]
    fn test_input_schema_merges_all_locations() {
        let tools = tools_from_spec(&sample_spec());
        let get = tools.iter().find(|t| t.name == "get_thing").unwrap();

        let schema = Value::Object(get.input_schema());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["thingId"]["type"], "integer");
        assert_eq!(schema["properties"]["verbose"]["type"], "boolean");

        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("thingId")));
        assert!(!required.contains(&json!("verbose")));
    }

    #[test]
    fn test_input_schema_carries_descriptions() {
        let tools = tools_from_spec(&sample_spec());
        let create = tools.iter().find(|t| t.name == "create_thing").unwrap();

        let schema = Value::Object(create.input_schema());
        assert_eq!(schema["properties"]["name"]["description"], "Display name");
        assert!(create.description.is_none());
    }

    #[test]
    fn test_empty_spec_yields_no_tools() {
        let spec = build_spec(&[], &[], &[]);
        assert!(tools_from_spec(&spec).is_empty());
    }
}
