//! Organization resource.

use super::actions::{MembershipChange, Relation, UsersAction};
use super::decode;
use super::models::{ListQuery, MembershipParams, Organization, OrganizationData, Page};
use super::users::UserResource;
use crate::action::ActionRequest;
use crate::dispatcher::ActionDispatcher;
use crate::error::ClientResult;
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// An organization given either by ID or as a fetched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrganizationRef(pub Uuid);

impl From<Uuid> for OrganizationRef {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<&Organization> for OrganizationRef {
    fn from(organization: &Organization) -> Self {
        Self(organization.id)
    }
}

/// Manages organizations and their member lists.
#[derive(Debug, Clone)]
pub struct OrganizationResource {
    dispatcher: ActionDispatcher,
}

impl OrganizationResource {
    /// Create the resource on top of a dispatcher.
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self { dispatcher }
    }

    fn organization_url(&self, id: Uuid, suffix: &str) -> String {
        self.dispatcher
            .session()
            .absolute_url(&format!("users/organization/{}/{}", id, suffix))
    }

    /// List organizations matching a query (first page of results).
    #[instrument(skip(self))]
    pub async fn get_organizations(&self, query: &ListQuery) -> ClientResult<Vec<Organization>> {
        let request = ActionRequest::new(&UsersAction::OrganizationList).with_params(query)?;
        let page: Page<Organization> = decode(self.dispatcher.dispatch(request).await?)?;
        Ok(page.results)
    }

    /// Get an organization by ID.
    #[instrument(skip(self))]
    pub async fn get_organization(&self, id: Uuid) -> ClientResult<Organization> {
        debug!("Fetching organization {}", id);

        let request = ActionRequest::new(&UsersAction::OrganizationRead)
            .with_url(self.organization_url(id, ""));
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Create an organization.
    #[instrument(skip(self, data))]
    pub async fn create_organization(&self, data: &OrganizationData) -> ClientResult<Organization> {
        let request = ActionRequest::new(&UsersAction::OrganizationCreate).with_params(data)?;
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Update an organization.
    ///
    /// A partial update skips schema validation; a full update validates.
    #[instrument(skip(self, data))]
    pub async fn update_organization(
        &self,
        id: Uuid,
        data: &OrganizationData,
        partial_update: bool,
    ) -> ClientResult<Organization> {
        let request = ActionRequest::new(&UsersAction::organization_update(partial_update))
            .with_params(data)?
            .with_validate(!partial_update)
            .with_url(self.organization_url(id, ""));

        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Delete an organization.
    ///
    /// The API refuses to delete organizations that still have users. With
    /// `force`, every administrator, member and restricted member is removed
    /// first: each user ID is resolved to its email, then one removal is sent
    /// per non-empty relation. Steps run one after the other and the first
    /// failure aborts the deletion, leaving earlier removals in place.
    #[instrument(skip(self))]
    pub async fn delete_organization(&self, id: Uuid, force: bool) -> ClientResult<()> {
        if force {
            let organization = self.get_organization(id).await?;
            let users = UserResource::new(self.dispatcher.clone());

            for relation in Relation::ALL {
                let mut emails = Vec::new();
                for user_id in organization.user_ids(relation) {
                    emails.push(users.get_user(*user_id).await?.email);
                }

                if !emails.is_empty() {
                    info!(%relation, count = emails.len(), "Removing users before delete");
                    self.change_membership(MembershipChange::Remove, relation, id, emails)
                        .await?;
                }
            }
        }

        let request = ActionRequest::new(&UsersAction::OrganizationDelete)
            .with_url(self.organization_url(id, ""));
        self.dispatcher.dispatch(request).await?;
        Ok(())
    }

    /// Add users to the members of an organization.
    pub async fn add_member<I, S>(
        &self,
        organization: impl Into<OrganizationRef>,
        emails: I,
    ) -> ClientResult<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_membership(MembershipChange::Add, Relation::Member, organization, emails)
            .await
    }

    /// Remove users from the members of an organization.
    pub async fn remove_member<I, S>(
        &self,
        organization: impl Into<OrganizationRef>,
        emails: I,
    ) -> ClientResult<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_membership(MembershipChange::Remove, Relation::Member, organization, emails)
            .await
    }

    /// Add users to the administrators of an organization.
    pub async fn add_administrator<I, S>(
        &self,
        organization: impl Into<OrganizationRef>,
        emails: I,
    ) -> ClientResult<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_membership(
            MembershipChange::Add,
            Relation::Administrator,
            organization,
            emails,
        )
        .await
    }

    /// Remove users from the administrators of an organization.
    pub async fn remove_administrator<I, S>(
        &self,
        organization: impl Into<OrganizationRef>,
        emails: I,
    ) -> ClientResult<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_membership(
            MembershipChange::Remove,
            Relation::Administrator,
            organization,
            emails,
        )
        .await
    }

    /// Add users to the restricted members of an organization.
    pub async fn add_restricted_member<I, S>(
        &self,
        organization: impl Into<OrganizationRef>,
        emails: I,
    ) -> ClientResult<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_membership(
            MembershipChange::Add,
            Relation::RestrictedMember,
            organization,
            emails,
        )
        .await
    }

    /// Remove users from the restricted members of an organization.
    pub async fn remove_restricted_member<I, S>(
        &self,
        organization: impl Into<OrganizationRef>,
        emails: I,
    ) -> ClientResult<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_membership(
            MembershipChange::Remove,
            Relation::RestrictedMember,
            organization,
            emails,
        )
        .await
    }

    /// Add users to, or remove users from, one relation of an organization.
    ///
    /// Users are given by email. Returns the API response body.
    pub async fn change_membership<I, S>(
        &self,
        change: MembershipChange,
        relation: Relation,
        organization: impl Into<OrganizationRef>,
        emails: I,
    ) -> ClientResult<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let OrganizationRef(id) = organization.into();
        let params = MembershipParams {
            users: emails.into_iter().map(Into::into).collect(),
        };

        debug!(
            organization = %id,
            %relation,
            change = change.as_str(),
            users = params.users.len(),
            "Changing organization membership"
        );

        let request = ActionRequest::new(&UsersAction::OrganizationMembership(change, relation))
            .with_params(&params)?
            .with_validate(false)
            .with_url(self.organization_url(
                id,
                &format!("{}_{}/", change.as_str(), relation.as_str()),
            ));

        self.dispatcher.dispatch(request).await
    }
}
