//! Schema-driven HTTP transport.
//!
//! [`SchemaClient`] is the capability the rest of the crate builds on: fetch the
//! schema of a domain, and execute one action of that schema. [`HttpSchemaClient`]
//! implements it over `reqwest`.

use crate::action::{ActionRequest, Encoding};
use crate::config::{schema_url, SessionConfig};
use crate::error::{ClientError, ClientResult};
use crate::schema::{ApiSchema, FieldLocation, Link};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

/// Fetches schemas and executes schema actions.
#[async_trait]
pub trait SchemaClient: Send + Sync {
    /// Fetch and parse the schema published at `domain`.
    async fn fetch_schema(&self, domain: &str) -> ClientResult<ApiSchema>;

    /// Execute one action and return the decoded response body.
    ///
    /// Non-success responses are returned as [`ClientError::Api`].
    async fn execute(&self, schema: &ApiSchema, request: &ActionRequest) -> ClientResult<Value>;
}

/// `reqwest` implementation of [`SchemaClient`].
#[derive(Clone)]
pub struct HttpSchemaClient {
    /// HTTP client instance.
    client: Client,

    /// Value of the `Authorization` header.
    authorization: String,
}

impl std::fmt::Debug for HttpSchemaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSchemaClient").finish_non_exhaustive()
    }
}

impl HttpSchemaClient {
    /// Create a client authenticating with `Authorization: Token <token>`.
    pub fn new(config: &SessionConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            authorization: format!("Token {}", config.token),
        })
    }

    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("API error ({}): {}", status.as_u16(), body);
            return Err(ClientError::api(status.as_u16(), body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SchemaClient for HttpSchemaClient {
    #[instrument(skip(self))]
    async fn fetch_schema(&self, domain: &str) -> ClientResult<ApiSchema> {
        let url = schema_url(domain);
        debug!("Fetching schema from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/openapi+json, application/json")
            .send()
            .await?;

        let document = self.handle_response(response).await?;
        ApiSchema::from_openapi(domain, document)
    }

    #[instrument(skip(self, schema, request), fields(action = %request.keys.join("/")))]
    async fn execute(&self, schema: &ApiSchema, request: &ActionRequest) -> ClientResult<Value> {
        let link = schema.link(&request.keys)?;

        if request.validate {
            let concrete_url = request.overrides.url.is_some();
            validate_params(&request.keys, link, &request.params, concrete_url)?;
        }

        let parts = split_params(link, &request.params);
        let template = request.overrides.url.as_deref().unwrap_or(&link.url);
        let url = interpolate(template, &parts.path);
        let method = reqwest::Method::from_bytes(link.method.as_bytes())
            .map_err(|e| ClientError::schema(&request.keys, e.to_string()))?;

        debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method, &url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json");

        if !parts.query.is_empty() {
            builder = builder.query(&parts.query);
        }

        for (name, value) in &parts.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let encoding = request
            .encoding
            .unwrap_or_else(|| Encoding::from_consumes(&link.consumes));

        builder = match parts.body {
            Some(body) => builder.json(&merge_body(&request.keys, body, parts.form)?),
            None if parts.form.is_empty() => builder,
            None => match encoding {
                Encoding::Json => builder.json(&parts.form),
                Encoding::Form => builder.form(&form_pairs(&parts.form)),
            },
        };

        let response = builder.send().await?;
        self.handle_response(response).await
    }
}

/// Parameters sorted by where they travel.
#[derive(Debug, Default)]
struct RequestParts {
    path: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    form: Map<String, Value>,
}

// Path fields count as supplied when the caller already resolved the URL.
fn validate_params(
    keys: &[String],
    link: &Link,
    params: &Map<String, Value>,
    concrete_url: bool,
) -> ClientResult<()> {
    for name in params.keys() {
        if link.field(name).is_none() {
            return Err(ClientError::schema(
                keys,
                format!("unknown parameter '{}'", name),
            ));
        }
    }

    let required = link
        .fields
        .iter()
        .filter(|f| f.required)
        .filter(|f| !(concrete_url && f.location == FieldLocation::Path));

    for field in required {
        if !params.contains_key(&field.name) {
            return Err(ClientError::schema(
                keys,
                format!("missing required parameter '{}'", field.name),
            ));
        }
    }

    Ok(())
}

fn split_params(link: &Link, params: &Map<String, Value>) -> RequestParts {
    let mut parts = RequestParts::default();

    for (name, value) in params {
        let location = match link.field(name) {
            Some(field) => field.location,
            None if link.sends_undeclared_as_query() => FieldLocation::Query,
            None => FieldLocation::FormData,
        };

        match location {
            FieldLocation::Path => parts.path.push((name.clone(), scalar(value))),
            FieldLocation::Query => match value {
                Value::Array(items) => {
                    parts
                        .query
                        .extend(items.iter().map(|item| (name.clone(), scalar(item))));
                }
                Value::Null => {}
                _ => parts.query.push((name.clone(), scalar(value))),
            },
            FieldLocation::Header => parts.headers.push((name.clone(), scalar(value))),
            FieldLocation::Body => parts.body = Some(value.clone()),
            FieldLocation::FormData => {
                parts.form.insert(name.clone(), value.clone());
            }
        }
    }

    parts
}

// Values are percent-encoded so each one stays a single path segment.
fn interpolate(template: &str, path: &[(String, String)]) -> String {
    path.iter().fold(template.to_string(), |url, (name, value)| {
        url.replace(&format!("{{{}}}", name), &urlencoding::encode(value))
    })
}

// Fields outside the declared body are merged into it; only an object body can take them.
fn merge_body(keys: &[String], body: Value, form: Map<String, Value>) -> ClientResult<Value> {
    if form.is_empty() {
        return Ok(body);
    }

    match body {
        Value::Object(mut object) => {
            debug!(fields = form.len(), "Merging extra fields into the request body");
            object.extend(form);
            Ok(Value::Object(object))
        }
        _ => Err(ClientError::schema(
            keys,
            format!(
                "cannot send fields [{}] alongside a non-object body",
                form.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        )),
    }
}

fn form_pairs(form: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in form {
        match value {
            Value::Array(items) => pairs.extend(items.iter().map(|i| (name.clone(), scalar(i)))),
            _ => pairs.push((name.clone(), scalar(value))),
        }
    }
    pairs
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde_json::json;

    fn link(method: &str, fields: Vec<Field>) -> Link {
        Link {
            method: method.to_string(),
            url: "https://api.example.com/users/user/{id}/".to_string(),
            fields,
            consumes: vec![],
        }
    }

    fn field(name: &str, location: FieldLocation, required: bool) -> Field {
        Field {
            name: name.to_string(),
            location,
            required,
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_split_by_location() {
        let link = link(
            "PATCH",
            vec![
                field("id", FieldLocation::Path, true),
                field("expand", FieldLocation::Query, false),
                field("first_name", FieldLocation::FormData, false),
            ],
        );

        let parts = split_params(
            &link,
            &params(json!({
                "id": 7,
                "expand": ["organizations", "groups"],
                "first_name": "Ada",
                "undeclared": true
            })),
        );

        assert_eq!(parts.path, vec![("id".to_string(), "7".to_string())]);
        assert_eq!(parts.query.len(), 2);
        assert_eq!(parts.form.len(), 2);
        assert!(parts.form.contains_key("undeclared"));
        assert!(parts.body.is_none());
    }

    #[test]
    fn test_undeclared_params_go_to_query_on_get() {
        let link = link("GET", vec![]);
        let parts = split_params(&link, &params(json!({"email": "x@example.com"})));
        assert_eq!(
            parts.query,
            vec![("email".to_string(), "x@example.com".to_string())]
        );
        assert!(parts.form.is_empty());
    }

    #[test]
    fn test_body_field() {
        let link = link("POST", vec![field("data", FieldLocation::Body, true)]);
        let parts = split_params(&link, &params(json!({"data": {"name": "Acme"}})));
        assert_eq!(parts.body, Some(json!({"name": "Acme"})));
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(
            interpolate(
                "https://api.example.com/users/user/{id}/",
                &[("id".to_string(), "12".to_string())]
            ),
            "https://api.example.com/users/user/12/"
        );
    }

    #[test]
    fn test_interpolate_encodes_reserved_characters() {
        let url = interpolate(
            "https://api.example.com/companies/company/{id}/",
            &[("id".to_string(), "a/b?x=1#y".to_string())],
        );

        assert_eq!(url, "https://api.example.com/companies/company/a%2Fb%3Fx%3D1%23y/");

        let parsed = reqwest::Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/companies/company/a%2Fb%3Fx%3D1%23y/");
        assert!(parsed.query().is_none());
        assert!(parsed.fragment().is_none());
    }

    #[test]
    fn test_extra_fields_merge_into_object_body() {
        let keys = vec!["users".to_string(), "user_create".to_string()];
        let link = link("POST", vec![field("data", FieldLocation::Body, true)]);
        let parts = split_params(
            &link,
            &params(json!({"data": {"name": "Acme"}, "country": "US"})),
        );

        let body = merge_body(&keys, parts.body.unwrap(), parts.form).unwrap();
        assert_eq!(body, json!({"name": "Acme", "country": "US"}));
    }

    #[test]
    fn test_extra_fields_rejected_with_scalar_body() {
        let keys = vec!["users".to_string(), "user_create".to_string()];
        let link = link("POST", vec![field("data", FieldLocation::Body, true)]);
        let parts = split_params(&link, &params(json!({"data": [1, 2], "country": "US"})));

        let err = merge_body(&keys, parts.body.unwrap(), parts.form).unwrap_err();
        assert!(matches!(err, ClientError::SchemaResolution { .. }));
        assert!(err.to_string().contains("country"));
    }

    #[test]
    fn test_validation() {
        let keys = vec!["users".to_string(), "user_update".to_string()];
        let link = link(
            "PUT",
            vec![
                field("id", FieldLocation::Path, true),
                field("email", FieldLocation::FormData, true),
            ],
        );

        assert!(
            validate_params(&keys, &link, &params(json!({"id": 1, "email": "a"})), false).is_ok()
        );

        let err = validate_params(&keys, &link, &params(json!({"id": 1})), false).unwrap_err();
        assert!(err.to_string().contains("missing required parameter 'email'"));

        let err = validate_params(
            &keys,
            &link,
            &params(json!({"id": 1, "email": "a", "x": 0})),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown parameter 'x'"));

        let err = validate_params(&keys, &link, &params(json!({"email": "a"})), false).unwrap_err();
        assert!(err.to_string().contains("missing required parameter 'id'"));
        assert!(validate_params(&keys, &link, &params(json!({"email": "a"})), true).is_ok());
    }

    #[test]
    fn test_form_pairs_flatten_lists() {
        let pairs = form_pairs(&params(json!({"users": ["a@x.io", "b@x.io"]})));
        assert_eq!(
            pairs,
            vec![
                ("users".to_string(), "a@x.io".to_string()),
                ("users".to_string(), "b@x.io".to_string())
            ]
        );
    }
}
