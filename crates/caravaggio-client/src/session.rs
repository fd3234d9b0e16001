//! Authenticated session.
//!
//! A [`Session`] holds the resolved domain and token, the transport, and the
//! schema of its domain. The schema comes from a [`SchemaCache`], so building
//! several sessions for the same domain fetches it only once.

use crate::action::ActionRequest;
use crate::cache::SchemaCache;
use crate::config::{ApiProfile, SessionConfig};
use crate::error::ClientResult;
use crate::schema::ApiSchema;
use crate::transport::{HttpSchemaClient, SchemaClient};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Builder for [`Session`].
///
/// # Example
///
/// ```rust,no_run
/// use caravaggio_client::{ApiProfile, Session};
///
/// async fn example() -> caravaggio_client::ClientResult<()> {
///     let session = Session::builder()
///         .profile(ApiProfile::CARAVAGGIO)
///         .token("secret")
///         .connect()
///         .await?;
///
///     println!("{} actions", session.schema().await.len());
///     Ok(())
/// }
/// ```
#[derive(Default)]
pub struct SessionBuilder {
    profile: ApiProfile,
    token: Option<String>,
    domain: Option<String>,
    config: Option<SessionConfig>,
    cache: Option<SchemaCache>,
    client: Option<Arc<dyn SchemaClient>>,
}

impl SessionBuilder {
    /// Profile used to resolve the domain and token from the environment.
    pub fn profile(mut self, profile: ApiProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Explicit token; wins over the environment.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Explicit domain; wins over the environment.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Use a fully resolved configuration instead of the environment.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Schema cache to read from and populate. Defaults to [`SchemaCache::shared`].
    pub fn cache(mut self, cache: SchemaCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Transport to use. Defaults to [`HttpSchemaClient`].
    pub fn client(mut self, client: Arc<dyn SchemaClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Resolve the configuration and load the schema.
    ///
    /// Fails with [`crate::ClientError::Configuration`] when no token is available.
    pub async fn connect(self) -> ClientResult<Session> {
        let config = match self.config {
            Some(config) => config,
            None => SessionConfig::from_env(&self.profile, self.token, self.domain)?,
        };

        let client: Arc<dyn SchemaClient> = match self.client {
            Some(client) => client,
            None => Arc::new(HttpSchemaClient::new(&config)?),
        };

        let cache = self.cache.unwrap_or_else(SchemaCache::shared);
        let schema = load_schema(&cache, client.as_ref(), &config.domain).await?;

        Ok(Session {
            config,
            client,
            cache,
            schema: RwLock::new(schema),
        })
    }
}

/// An authenticated connection to one API domain.
pub struct Session {
    config: SessionConfig,
    client: Arc<dyn SchemaClient>,
    cache: SchemaCache,
    schema: RwLock<Arc<ApiSchema>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("domain", &self.config.domain)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start building a session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Resolved configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// API base URL.
    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Cache this session reads schemas from.
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Join the domain and a relative path.
    pub fn absolute_url(&self, relative: &str) -> String {
        self.config.url(relative)
    }

    /// Current schema.
    pub async fn schema(&self) -> Arc<ApiSchema> {
        self.schema.read().await.clone()
    }

    /// Drop the cached schema of this domain and fetch it again.
    #[instrument(skip(self), fields(domain = %self.config.domain))]
    pub async fn refresh_schema(&self) -> ClientResult<Arc<ApiSchema>> {
        self.cache.invalidate(&self.config.domain).await;
        let schema = load_schema(&self.cache, self.client.as_ref(), &self.config.domain).await?;
        *self.schema.write().await = schema.clone();
        Ok(schema)
    }

    /// Execute one action once, without retries.
    pub async fn execute(&self, request: &ActionRequest) -> ClientResult<Value> {
        let schema = self.schema().await;
        self.client.execute(&schema, request).await
    }
}

async fn load_schema(
    cache: &SchemaCache,
    client: &dyn SchemaClient,
    domain: &str,
) -> ClientResult<Arc<ApiSchema>> {
    if let Some(schema) = cache.get(domain).await {
        debug!(domain, "Using cached schema");
        return Ok(schema);
    }

    let schema = client.fetch_schema(domain).await?;
    info!(domain, actions = schema.len(), "Fetched API schema");
    Ok(cache.insert(domain, schema).await)
}
