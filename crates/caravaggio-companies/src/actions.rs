//! Typed identifiers for the company actions.

use caravaggio_client::ActionKeys;

/// Actions of the company API, all under the `companies` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompaniesAction {
    /// Full-text search over companies
    SearchList,
    /// Facet counts of a search
    SearchFacets,
    /// Read one company
    Read,
    /// Create a company
    Create,
    /// Replace a company
    Update,
    /// Update some fields of a company
    PartialUpdate,
    /// Delete a company
    Delete,
}

impl CompaniesAction {
    /// Schema tag of every company action.
    pub const TAG: &'static str = "companies";

    /// Full or partial update.
    pub fn update(partial: bool) -> Self {
        if partial {
            CompaniesAction::PartialUpdate
        } else {
            CompaniesAction::Update
        }
    }

    /// Name of the action within the tag.
    pub fn name(&self) -> &'static str {
        match self {
            CompaniesAction::SearchList => "company_search_list",
            CompaniesAction::SearchFacets => "company_search_facets",
            CompaniesAction::Read => "company_read",
            CompaniesAction::Create => "company_create",
            CompaniesAction::Update => "company_update",
            CompaniesAction::PartialUpdate => "company_partial_update",
            CompaniesAction::Delete => "company_delete",
        }
    }
}

impl ActionKeys for CompaniesAction {
    fn keys(&self) -> Vec<String> {
        vec![Self::TAG.to_string(), self.name().to_string()]
    }
}
