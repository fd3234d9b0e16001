//! Company resource.

use crate::actions::CompaniesAction;
use crate::models::{Company, CompanyData, CompanySearch};
use caravaggio_client::action::to_params;
use caravaggio_client::resources::decode;
use caravaggio_client::{ActionDispatcher, ActionRequest, ClientError, ClientResult, Page};
use serde_json::Value;
use tracing::{debug, instrument};

/// Searches and manages companies.
#[derive(Debug, Clone)]
pub struct CompanyResource {
    dispatcher: ActionDispatcher,
}

impl CompanyResource {
    /// Create the resource on top of a dispatcher.
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Search companies.
    #[instrument(skip(self))]
    pub async fn list(&self, search: &CompanySearch) -> ClientResult<Page<Company>> {
        let request = ActionRequest::new(&CompaniesAction::SearchList)
            .with_params(search)?
            .with_validate(false);
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Facet counts for a search.
    #[instrument(skip(self))]
    pub async fn facets(&self, search: &CompanySearch) -> ClientResult<Value> {
        let request = ActionRequest::new(&CompaniesAction::SearchFacets)
            .with_params(search)?
            .with_validate(false);
        self.dispatcher.dispatch(request).await
    }

    /// Get a company by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> ClientResult<Company> {
        let request = ActionRequest::new(&CompaniesAction::Read).with_param("id", id);
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Create a company.
    #[instrument(skip(self, data))]
    pub async fn create(&self, data: &CompanyData) -> ClientResult<Company> {
        let request = ActionRequest::new(&CompaniesAction::Create).with_params(data)?;
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Update a company.
    ///
    /// A partial update skips schema validation; a full update validates.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidArgument`] if `data` sets no field.
    #[instrument(skip(self, data))]
    pub async fn update(
        &self,
        id: &str,
        data: &CompanyData,
        partial_update: bool,
    ) -> ClientResult<Company> {
        let mut params = to_params(data)?;
        if params.is_empty() {
            return Err(ClientError::InvalidArgument(
                "The data must contain at least one field".to_string(),
            ));
        }
        params.insert("id".to_string(), Value::from(id));

        debug!(fields = params.len(), partial_update, "Updating company");

        let mut request = ActionRequest::new(&CompaniesAction::update(partial_update))
            .with_validate(!partial_update);
        request.params = params;

        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Delete a company.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        let request = ActionRequest::new(&CompaniesAction::Delete).with_param("id", id);
        self.dispatcher.dispatch(request).await?;
        Ok(())
    }
}
