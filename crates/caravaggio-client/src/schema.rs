//! OpenAPI schema model.
//!
//! The service publishes a Swagger 2.0 document. Each operation becomes a
//! [`Link`] addressed by a key path: `[tag, name]`, where `name` is the
//! `operationId` with its `"{tag}_"` prefix removed. An operation tagged `users`
//! with id `users_user_read` is therefore reachable as `["users", "user_read"]`.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// Where a parameter travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldLocation {
    /// Interpolated into the URL template
    Path,
    /// Query string
    Query,
    /// The whole request body
    Body,
    /// One field of the request body
    FormData,
    /// Request header
    Header,
}

/// A parameter accepted by a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Parameter name
    pub name: String,

    /// Parameter location
    #[serde(rename = "in")]
    pub location: FieldLocation,

    /// Whether the parameter must be supplied
    #[serde(default)]
    pub required: bool,
}

/// One executable operation of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Upper-case HTTP method
    pub method: String,

    /// Absolute URL template, with `{name}` placeholders for path fields
    pub url: String,

    /// Accepted parameters
    pub fields: Vec<Field>,

    /// Request content types declared by the operation
    pub consumes: Vec<String>,
}

impl Link {
    /// Look up a declared parameter by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether query-only placement applies to undeclared parameters.
    pub fn sends_undeclared_as_query(&self) -> bool {
        matches!(self.method.as_str(), "GET" | "DELETE")
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    host: Option<String>,
    #[serde(default, rename = "basePath")]
    base_path: Option<String>,
    #[serde(default)]
    schemes: Vec<String>,
    #[serde(default)]
    consumes: Vec<String>,
    #[serde(default)]
    paths: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    definitions: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawOperation {
    #[serde(default, rename = "operationId")]
    operation_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    parameters: Vec<Value>,
    #[serde(default)]
    consumes: Vec<String>,
}

/// A parsed API schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSchema {
    base_url: String,
    links: BTreeMap<Vec<String>, Link>,
}

impl ApiSchema {
    /// Parse a Swagger 2.0 document fetched from `domain`.
    ///
    /// Link URLs use the document's `host` and first scheme when present,
    /// otherwise the origin of `domain`.
    pub fn from_openapi(domain: &str, document: Value) -> ClientResult<Self> {
        let raw: RawDocument = serde_json::from_value(document)?;
        let base_url = base_url(domain, &raw);
        let mut links = BTreeMap::new();

        for (path, item) in &raw.paths {
            let shared = match item.get("parameters").and_then(Value::as_array) {
                Some(params) => parse_fields(params, &raw.definitions),
                None => Vec::new(),
            };

            for (method, operation) in item {
                if !HTTP_METHODS.contains(&method.as_str()) {
                    continue;
                }

                let operation: RawOperation = serde_json::from_value(operation.clone())?;
                let Some(operation_id) = operation.operation_id else {
                    continue;
                };

                let keys = match operation.tags.first() {
                    Some(tag) => {
                        let prefix = format!("{}_", tag);
                        let name = operation_id
                            .strip_prefix(&prefix)
                            .unwrap_or(&operation_id)
                            .to_string();
                        vec![tag.clone(), name]
                    }
                    None => vec![operation_id.clone()],
                };

                let mut fields = shared.clone();
                for field in parse_fields(&operation.parameters, &raw.definitions) {
                    fields.retain(|f| f.name != field.name);
                    fields.push(field);
                }

                let consumes = if operation.consumes.is_empty() {
                    raw.consumes.clone()
                } else {
                    operation.consumes
                };

                links.insert(
                    keys,
                    Link {
                        method: method.to_uppercase(),
                        url: format!("{}{}", base_url, path),
                        fields,
                        consumes,
                    },
                );
            }
        }

        Ok(Self { base_url, links })
    }

    /// Base URL every link is built on.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a key path to its link.
    pub fn link(&self, keys: &[String]) -> ClientResult<&Link> {
        if keys.is_empty() {
            return Err(ClientError::schema(keys, "empty action path"));
        }

        self.links
            .get(keys)
            .ok_or_else(|| ClientError::schema(keys, "no such action in the schema"))
    }

    /// Whether the key path resolves to a link.
    pub fn contains(&self, keys: &[String]) -> bool {
        self.links.contains_key(keys)
    }

    /// Number of links in the schema.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the schema declares no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

// A body parameter described by an object schema is expanded into one form
// field per property. Entries that are not plain parameters are skipped.
fn parse_fields(params: &[Value], definitions: &Map<String, Value>) -> Vec<Field> {
    let mut fields = Vec::new();

    for param in params {
        if param.get("in").and_then(Value::as_str) == Some("body") {
            let schema = param.get("schema").map(|s| dereference(s, definitions));
            if let Some(properties) = schema.and_then(|s| s.get("properties")).and_then(Value::as_object) {
                let required: Vec<&str> = schema
                    .and_then(|s| s.get("required"))
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();

                fields.extend(properties.iter().filter(|(_, p)| !is_read_only(p)).map(
                    |(name, _)| Field {
                        name: name.clone(),
                        location: FieldLocation::FormData,
                        required: required.contains(&name.as_str()),
                    },
                ));
                continue;
            }
        }

        if let Ok(field) = serde_json::from_value::<Field>(param.clone()) {
            fields.push(field);
        }
    }

    fields
}

fn dereference<'a>(schema: &'a Value, definitions: &'a Map<String, Value>) -> &'a Value {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix("#/definitions/"))
        .and_then(|name| definitions.get(name))
        .unwrap_or(schema)
}

fn is_read_only(property: &Value) -> bool {
    property.get("readOnly").and_then(Value::as_bool).unwrap_or(false)
}

fn base_url(domain: &str, raw: &RawDocument) -> String {
    let base_path = raw
        .base_path
        .as_deref()
        .unwrap_or("")
        .trim_end_matches('/')
        .to_string();

    let (domain_scheme, domain_rest) = domain.split_once("://").unwrap_or(("https", domain));

    let origin = match &raw.host {
        Some(host) => {
            let scheme = raw.schemes.first().map(String::as_str).unwrap_or(domain_scheme);
            format!("{}://{}", scheme, host)
        }
        None => {
            let host = domain_rest.split('/').next().unwrap_or(domain_rest);
            format!("{}://{}", domain_scheme, host)
        }
    };

    format!("{}{}", origin, base_path)
}
