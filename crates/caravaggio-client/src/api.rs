//! Entry point of the Caravaggio bindings.

use crate::config::ApiProfile;
use crate::dispatcher::ActionDispatcher;
use crate::error::ClientResult;
use crate::resources::{OrganizationResource, UserResource};
use crate::session::Session;
use std::sync::Arc;
use tracing::info;

/// Connected bindings exposing the user and organization resources.
///
/// Cloning is cheap; clones share the session.
#[derive(Debug, Clone)]
pub struct CaravaggioApi {
    dispatcher: ActionDispatcher,
}

impl CaravaggioApi {
    /// Connect with the Caravaggio profile.
    ///
    /// `token` and `domain` win over `CARAVAGGIO_TOKEN` and `CARAVAGGIO_DOMAIN`;
    /// the domain defaults to `https://bgds.io`.
    pub async fn connect(token: Option<String>, domain: Option<String>) -> ClientResult<Self> {
        Self::connect_with(ApiProfile::CARAVAGGIO, token, domain).await
    }

    /// Connect with another profile, e.g. a binding for a different service.
    pub async fn connect_with(
        profile: ApiProfile,
        token: Option<String>,
        domain: Option<String>,
    ) -> ClientResult<Self> {
        let mut builder = Session::builder().profile(profile);
        if let Some(token) = token {
            builder = builder.token(token);
        }
        if let Some(domain) = domain {
            builder = builder.domain(domain);
        }

        let session = builder.connect().await?;
        info!(domain = session.domain(), "Connected to API");
        Ok(Self::from_session(Arc::new(session)))
    }

    /// Wrap an existing session.
    pub fn from_session(session: Arc<Session>) -> Self {
        Self::from_dispatcher(ActionDispatcher::new(session))
    }

    /// Wrap an existing dispatcher, keeping its retry policy.
    pub fn from_dispatcher(dispatcher: ActionDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Users of the service.
    pub fn users(&self) -> UserResource {
        UserResource::new(self.dispatcher.clone())
    }

    /// Organizations and their memberships.
    pub fn organizations(&self) -> OrganizationResource {
        OrganizationResource::new(self.dispatcher.clone())
    }

    /// Dispatcher shared by the resources, for actions without a facade.
    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Underlying session.
    pub fn session(&self) -> &Arc<Session> {
        self.dispatcher.session()
    }
}
