//! User resource.

use super::actions::UsersAction;
use super::decode;
use super::models::{ListQuery, Page, TokenResponse, User, UserData, UserId};
use crate::action::ActionRequest;
use crate::dispatcher::ActionDispatcher;
use crate::error::{ClientError, ClientResult};
use tracing::{debug, instrument};

/// Manages the users of the service.
#[derive(Debug, Clone)]
pub struct UserResource {
    dispatcher: ActionDispatcher,
}

impl UserResource {
    /// Create the resource on top of a dispatcher.
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self { dispatcher }
    }

    fn user_url(&self, id: UserId) -> String {
        self.dispatcher
            .session()
            .absolute_url(&format!("users/user/{}/", id))
    }

    /// Obtain an API token on behalf of a user. Requires an admin token.
    #[instrument(skip(self))]
    pub async fn get_user_token(&self, email: &str) -> ClientResult<String> {
        let request = ActionRequest::new(&UsersAction::AdminTokenCreate)
            .with_param("email", email)
            .with_validate(false);

        let response: TokenResponse = decode(self.dispatcher.dispatch(request).await?)?;
        Ok(response.token)
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> ClientResult<User> {
        debug!("Fetching user {}", id);

        let request = ActionRequest::new(&UsersAction::UserRead).with_url(self.user_url(id));
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// List users matching a query.
    #[instrument(skip(self))]
    pub async fn get_users(&self, query: &ListQuery) -> ClientResult<Page<User>> {
        let request = ActionRequest::new(&UsersAction::UserList).with_params(query)?;
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Get the only user with the given email.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotFound`] when no user has this email and
    /// [`ClientError::MultipleFound`] when several do.
    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> ClientResult<User> {
        let page = self
            .get_users(&ListQuery::default().filter("email", email))
            .await?;

        if page.count > 1 {
            return Err(ClientError::MultipleFound(format!(
                "Multiple users found with the same email [{}]",
                email
            )));
        }

        match (page.count, page.results.into_iter().next()) {
            (1, Some(user)) => Ok(user),
            _ => Err(ClientError::NotFound(format!(
                "There is no user with the informed email [{}]",
                email
            ))),
        }
    }

    /// Create a user.
    #[instrument(skip(self, data))]
    pub async fn create_user(&self, data: &UserData) -> ClientResult<User> {
        let request = ActionRequest::new(&UsersAction::UserCreate).with_params(data)?;
        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Update a user.
    ///
    /// A partial update sends only the fields that are set and skips schema
    /// validation; a full update validates the complete record.
    #[instrument(skip(self, data))]
    pub async fn update_user(
        &self,
        id: UserId,
        data: &UserData,
        partial_update: bool,
    ) -> ClientResult<User> {
        let request = ActionRequest::new(&UsersAction::user_update(partial_update))
            .with_params(data)?
            .with_validate(!partial_update)
            .with_url(self.user_url(id));

        decode(self.dispatcher.dispatch(request).await?)
    }

    /// Delete a user.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> ClientResult<()> {
        let request = ActionRequest::new(&UsersAction::UserDelete).with_url(self.user_url(id));
        self.dispatcher.dispatch(request).await?;
        Ok(())
    }
}
