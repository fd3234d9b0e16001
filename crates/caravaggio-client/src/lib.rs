//! # Caravaggio Client
//!
//! Client bindings for the Caravaggio user and organization API.
//!
//! ## Overview
//!
//! The service describes itself with a Swagger 2.0 document. This crate
//! fetches that document once per domain, then turns method calls into HTTP
//! actions addressed by the document's tags and operation names:
//!
//! - **Session**: resolves domain and token, loads the schema through a cache
//! - **Dispatcher**: runs actions and retries them while the API answers 429
//! - **Resources**: typed facades for users and organizations
//!
//! ## Architecture
//!
//! ```text
//! CaravaggioApi
//!   ├─ UserResource ─────────┐
//!   └─ OrganizationResource ─┴─→ ActionDispatcher (retry on 429)
//!                                  └─ Session
//!                                       ├─ SchemaCache (per domain)
//!                                       └─ SchemaClient (reqwest)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use caravaggio_client::CaravaggioApi;
//!
//! async fn example() -> caravaggio_client::ClientResult<()> {
//!     // Reads CARAVAGGIO_TOKEN and CARAVAGGIO_DOMAIN
//!     let api = CaravaggioApi::connect(None, None).await?;
//!
//!     let user = api.users().get_user_by_email("ada@example.com").await?;
//!     let org = api.organizations().create_organization(
//!         &caravaggio_client::OrganizationData::named("Analytical Engines"),
//!     ).await?;
//!     api.organizations().add_member(&org, [user.email]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Extending
//!
//! Other services built on the same framework get their own [`ApiProfile`],
//! an enum implementing [`ActionKeys`] and a resource wrapping an
//! [`ActionDispatcher`].

pub mod action;
pub mod api;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod resources;
pub mod retry;
pub mod schema;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use action::{ActionKeys, ActionRequest, Encoding, Overrides, ResponseTransform};
pub use api::CaravaggioApi;
pub use cache::SchemaCache;
pub use config::{ApiProfile, SessionConfig};
pub use dispatcher::ActionDispatcher;
pub use error::{ClientError, ClientResult};
pub use resources::{
    ListQuery, MembershipChange, Organization, OrganizationData, OrganizationRef,
    OrganizationResource, Page, Relation, User, UserData, UserId, UserResource, UsersAction,
};
pub use retry::{RetryOverride, RetryPolicy};
pub use schema::{ApiSchema, Field, FieldLocation, Link};
pub use session::{Session, SessionBuilder};
pub use transport::{HttpSchemaClient, SchemaClient};
