//! User and organization models
//!
//! Response models keep any field they do not declare in `extra`, so records
//! survive a round trip even when the server adds attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::actions::Relation;

/// Identifier of a user.
pub type UserId = u64;

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matching records
    pub count: u64,

    /// URL of the next page
    #[serde(default)]
    pub next: Option<String>,

    /// URL of the previous page
    #[serde(default)]
    pub previous: Option<String>,

    /// Records of this page
    pub results: Vec<T>,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,

    /// Login name
    #[serde(default)]
    pub username: String,

    /// Email address
    pub email: String,

    /// Given name
    #[serde(default)]
    pub first_name: String,

    /// Family name
    #[serde(default)]
    pub last_name: String,

    /// Whether the account can log in
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Whether the user can access the admin site
    #[serde(default)]
    pub is_staff: bool,

    /// When the account was created
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,

    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An organization and its member lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Owner user ID
    #[serde(default)]
    pub owner: Option<UserId>,

    /// Administrator user IDs
    #[serde(default)]
    pub administrators: Vec<UserId>,

    /// Member user IDs
    #[serde(default)]
    pub members: Vec<UserId>,

    /// Restricted member user IDs
    #[serde(default)]
    pub restricted_members: Vec<UserId>,

    /// Whether the organization is active
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Creation timestamp
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    /// Last update timestamp
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,

    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Organization {
    /// User IDs holding the given relation.
    pub fn user_ids(&self, relation: Relation) -> &[UserId] {
        match relation {
            Relation::Member => &self.members,
            Relation::Administrator => &self.administrators,
            Relation::RestrictedMember => &self.restricted_members,
        }
    }
}

/// Fields sent when creating or updating a user.
///
/// Unset fields are omitted, which is what a partial update expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// Login name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Password (write only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Whether the account can log in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// Additional fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserData {
    /// Data with a username and an email.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

/// Fields sent when creating or updating an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationData {
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Owner user ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,

    /// Whether the organization is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// Additional fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrganizationData {
    /// Data with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Filters for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Records per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Field filters, e.g. `email` or `name`
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Add a field filter.
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Request a page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Users added to or removed from an organization relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipParams {
    /// User emails
    pub users: Vec<String>,
}

/// Token issued for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_organization_keeps_unknown_fields() {
        let org: Organization = serde_json::from_value(json!({
            "id": "8f0d3a4e-4a51-4d8c-9a77-6a5a1c1f2f10",
            "name": "BGDS",
            "administrators": [5],
            "members": [],
            "restricted_members": [7, 8],
            "created": "2019-04-01T10:00:00Z",
            "number_of_total_members": 3
        }))
        .unwrap();

        assert_eq!(org.user_ids(Relation::Administrator), &[5]);
        assert!(org.user_ids(Relation::Member).is_empty());
        assert_eq!(org.restricted_members, vec![7, 8]);
        assert!(org.is_active);
        assert_eq!(org.extra.get("number_of_total_members"), Some(&json!(3)));
    }

    #[test]
    fn test_user_data_skips_unset_fields() {
        let mut data = UserData::new("ada", "ada@example.com");
        data.extra.insert("is_superuser".to_string(), json!(false));

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"username": "ada", "email": "ada@example.com", "is_superuser": false})
        );
        assert_eq!(serde_json::to_value(UserData::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_list_query() {
        let query = ListQuery::default().filter("name", "BGDS").page(2);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 2, "name": "BGDS"})
        );
    }

    #[test]
    fn test_page() {
        let page: Page<User> = serde_json::from_value(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{"id": 5, "email": "a@example.com"}]
        }))
        .unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, 5);
        assert_eq!(page.results[0].username, "");
    }
}
