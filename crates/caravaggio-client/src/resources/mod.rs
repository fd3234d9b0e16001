//! Resource facades.
//!
//! Each facade wraps an [`ActionDispatcher`](crate::ActionDispatcher) and
//! exposes the API as typed methods.

pub mod actions;
pub mod models;
pub mod organizations;
pub mod users;

pub use actions::{MembershipChange, Relation, UsersAction};
pub use models::{
    ListQuery, MembershipParams, Organization, OrganizationData, Page, User, UserData, UserId,
};
pub use organizations::{OrganizationRef, OrganizationResource};
pub use users::UserResource;

use crate::error::ClientResult;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode an action response into a typed record.
pub fn decode<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    Ok(serde_json::from_value(value)?)
}
