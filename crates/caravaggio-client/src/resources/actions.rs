//! Typed identifiers for the user and organization actions.

use crate::action::ActionKeys;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship between a user and an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Regular member
    Member,
    /// Administrator of the organization
    Administrator,
    /// Member with restricted access
    RestrictedMember,
}

impl Relation {
    /// All relations, in the order they are cleared by a forced delete.
    pub const ALL: [Relation; 3] = [
        Relation::Administrator,
        Relation::Member,
        Relation::RestrictedMember,
    ];

    /// Name used in URLs and action keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Member => "member",
            Relation::Administrator => "administrator",
            Relation::RestrictedMember => "restricted_member",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a membership change adds or removes users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipChange {
    /// Add users to the relation
    Add,
    /// Remove users from the relation
    Remove,
}

impl MembershipChange {
    /// Verb used in URLs and action keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipChange::Add => "add",
            MembershipChange::Remove => "remove",
        }
    }
}

/// Actions of the user management API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsersAction {
    /// Obtain an API token on behalf of a user
    AdminTokenCreate,
    /// List users
    UserList,
    /// Read one user
    UserRead,
    /// Create a user
    UserCreate,
    /// Replace a user
    UserUpdate,
    /// Update some fields of a user
    UserPartialUpdate,
    /// Delete a user
    UserDelete,
    /// List organizations
    OrganizationList,
    /// Read one organization
    OrganizationRead,
    /// Create an organization
    OrganizationCreate,
    /// Replace an organization
    OrganizationUpdate,
    /// Update some fields of an organization
    OrganizationPartialUpdate,
    /// Delete an organization
    OrganizationDelete,
    /// Add users to, or remove users from, an organization relation
    OrganizationMembership(MembershipChange, Relation),
}

impl UsersAction {
    /// Full or partial user update.
    pub fn user_update(partial: bool) -> Self {
        if partial {
            UsersAction::UserPartialUpdate
        } else {
            UsersAction::UserUpdate
        }
    }

    /// Full or partial organization update.
    pub fn organization_update(partial: bool) -> Self {
        if partial {
            UsersAction::OrganizationPartialUpdate
        } else {
            UsersAction::OrganizationUpdate
        }
    }

    /// Name of the action within its tag.
    pub fn name(&self) -> String {
        let name = match self {
            UsersAction::AdminTokenCreate => "create",
            UsersAction::UserList => "user_list",
            UsersAction::UserRead => "user_read",
            UsersAction::UserCreate => "user_create",
            UsersAction::UserUpdate => "user_update",
            UsersAction::UserPartialUpdate => "user_partial_update",
            UsersAction::UserDelete => "user_delete",
            UsersAction::OrganizationList => "organization_list",
            UsersAction::OrganizationRead => "organization_read",
            UsersAction::OrganizationCreate => "organization_create",
            UsersAction::OrganizationUpdate => "organization_update",
            UsersAction::OrganizationPartialUpdate => "organization_partial_update",
            UsersAction::OrganizationDelete => "organization_delete",
            UsersAction::OrganizationMembership(change, relation) => {
                return format!("organization_{}_{}", change.as_str(), relation.as_str());
            }
        };
        name.to_string()
    }

    /// Schema tag the action lives under.
    pub fn tag(&self) -> &'static str {
        match self {
            UsersAction::AdminTokenCreate => "admin-token-auth",
            _ => "users",
        }
    }
}

impl ActionKeys for UsersAction {
    fn keys(&self) -> Vec<String> {
        vec![self.tag().to_string(), self.name()]
    }
}
