//! # Caravaggio Companies
//!
//! Bindings for a company search service built on the same framework as the
//! Caravaggio user API. It shows how a service gets its own binding: a profile
//! naming its environment variables, a typed action enum, and a resource.
//!
//! ## Configuration
//!
//! - `MYAPI_TOKEN`: API token (required unless passed explicitly)
//! - `MYAPI_DOMAIN`: API base URL (default: `https://myservice.io`)
//! - `MYAPI_TIMEOUT_SECS`, `MYAPI_MAX_ATTEMPTS`, `MYAPI_RETRY_DELAY_SECS`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use caravaggio_companies::{CompaniesExt, CompanySearch};
//!
//! async fn example() -> caravaggio_client::ClientResult<()> {
//!     let api = caravaggio_companies::connect(None, None).await?;
//!
//!     let page = api
//!         .companies()
//!         .list(&CompanySearch::text("data").filter("country_code", "USA"))
//!         .await?;
//!
//!     for company in page.results {
//!         println!("{}", company.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod models;
pub mod resource;

pub use actions::CompaniesAction;
pub use models::{Company, CompanyData, CompanySearch};
pub use resource::CompanyResource;

use caravaggio_client::{ApiProfile, CaravaggioApi, ClientResult};

/// Profile of the company service.
pub const MYAPI: ApiProfile = ApiProfile {
    token_var: "MYAPI_TOKEN",
    domain_var: "MYAPI_DOMAIN",
    default_domain: "https://myservice.io",
    prefix: "MYAPI",
};

/// Connect to the company service.
///
/// `token` and `domain` win over `MYAPI_TOKEN` and `MYAPI_DOMAIN`.
pub async fn connect(token: Option<String>, domain: Option<String>) -> ClientResult<CaravaggioApi> {
    CaravaggioApi::connect_with(MYAPI, token, domain).await
}

/// Adds the company resource to connected bindings.
pub trait CompaniesExt {
    /// Companies of the service.
    fn companies(&self) -> CompanyResource;
}

impl CompaniesExt for CaravaggioApi {
    fn companies(&self) -> CompanyResource {
        CompanyResource::new(self.dispatcher().clone())
    }
}
