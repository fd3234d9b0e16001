//! Action descriptors.
//!
//! An action is one remote operation, addressed by its key path in the schema.
//! Operations are named with typed enums implementing [`ActionKeys`], and a call
//! is described by an [`ActionRequest`].

use crate::error::{ClientError, ClientResult};
use crate::retry::RetryOverride;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A typed operation identifier that maps to a schema key path.
pub trait ActionKeys {
    /// Ordered key path of the operation, e.g. `["users", "user_read"]`.
    fn keys(&self) -> Vec<String>;
}

impl ActionKeys for [&str] {
    fn keys(&self) -> Vec<String> {
        self.iter().map(|k| k.to_string()).collect()
    }
}

impl<const N: usize> ActionKeys for [&str; N] {
    fn keys(&self) -> Vec<String> {
        self.as_slice().keys()
    }
}

impl ActionKeys for Vec<String> {
    fn keys(&self) -> Vec<String> {
        self.clone()
    }
}

/// Request body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// `application/json`
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
}

impl Encoding {
    /// Pick the encoding for a list of content types declared by the schema.
    pub fn from_consumes(consumes: &[String]) -> Self {
        match consumes.first().map(String::as_str) {
            Some("application/x-www-form-urlencoded") => Encoding::Form,
            _ => Encoding::Json,
        }
    }
}

/// Per-call values that supersede what the schema would compute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Concrete target URL, for paths the schema cannot fill in by itself
    pub url: Option<String>,
}

impl Overrides {
    /// Override the target URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Function applied to a decoded response before it is returned.
#[derive(Clone)]
pub struct ResponseTransform(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl ResponseTransform {
    /// Wrap a transform function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Apply the transform.
    pub fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for ResponseTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseTransform")
    }
}

/// A single action call.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// Key path into the schema
    pub keys: Vec<String>,

    /// Operation parameters
    pub params: Map<String, Value>,

    /// Whether parameters are checked against the schema before sending
    pub validate: bool,

    /// Per-call overrides
    pub overrides: Overrides,

    /// Body encoding; defaults to what the schema declares
    pub encoding: Option<Encoding>,

    /// Applied to the decoded response
    pub transform: Option<ResponseTransform>,

    /// Per-call retry settings
    pub retry: RetryOverride,
}

impl ActionRequest {
    /// Create a validated request with no parameters.
    pub fn new(action: &(impl ActionKeys + ?Sized)) -> Self {
        Self {
            keys: action.keys(),
            params: Map::new(),
            validate: true,
            overrides: Overrides::default(),
            encoding: None,
            transform: None,
            retry: RetryOverride::default(),
        }
    }

    /// Replace the parameters with the fields of a serializable value.
    ///
    /// `value` must serialize to a JSON object (or `null` for no parameters).
    pub fn with_params<T: Serialize + ?Sized>(mut self, value: &T) -> ClientResult<Self> {
        self.params = to_params(value)?;
        Ok(self)
    }

    /// Set a single parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Toggle schema validation.
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Send the request to a concrete URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.overrides.url = Some(url.into());
        self
    }

    /// Force a body encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Transform the decoded response.
    pub fn with_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(ResponseTransform::new(f));
        self
    }

    /// Override the number of attempts for this call.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = Some(max_attempts);
        self
    }

    /// Override the delay between attempts for this call.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry.retry_delay = Some(retry_delay);
        self
    }
}

/// Convert a serializable value into an action parameter map.
pub fn to_params<T: Serialize + ?Sized>(value: &T) -> ClientResult<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(ClientError::InvalidArgument(format!(
            "action parameters must be an object, got {}",
            other
        ))),
    }
}
