//! Company models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A company record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Company ID
    pub id: String,

    /// Legal or trading name
    pub name: String,

    /// One-line description
    #[serde(default)]
    pub short_description: Option<String>,

    /// Full description
    #[serde(default)]
    pub long_description: Option<String>,

    /// Web domain
    #[serde(default)]
    pub domain: Option<String>,

    /// ISO country code of the headquarters
    #[serde(default)]
    pub country_code: Option<String>,

    /// Ticker symbol, for listed companies
    #[serde(default)]
    pub stock_symbol: Option<String>,

    /// Date the company was founded
    #[serde(default)]
    pub foundation_date: Option<NaiveDate>,

    /// Areas of activity
    #[serde(default)]
    pub specialties: Vec<String>,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields sent when creating or updating a company.
///
/// Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyData {
    /// Legal or trading name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// One-line description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    /// Full description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,

    /// Web domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// ISO country code of the headquarters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    /// Ticker symbol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_symbol: Option<String>,

    /// Date the company was founded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation_date: Option<NaiveDate>,

    /// Areas of activity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,

    /// Additional fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompanyData {
    /// Data with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Parameters of a company search.
///
/// Sent as is, without schema validation, so any filter the search backend
/// understands can be used (e.g. `country_code`, `name__contains`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySearch {
    /// Free text query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Records per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Sort field, prefixed by `-` for descending order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Field filters
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

impl CompanySearch {
    /// Search for a text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Add a field filter.
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Sort the results.
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Request a page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}
