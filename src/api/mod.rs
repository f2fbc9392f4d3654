//! Remote gateway and the per-entity API clients built on it

mod ai;
mod artworks;
mod comments;
mod events;
mod reservations;
mod workshops;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::fetch::FetchBuilder;
use crate::models::User;
use crate::roles::{self, Action, Role};
use crate::session::{SessionHolder, SignOutReason};
use crate::store::{InvalidationBus, Mutation};

pub use ai::*;
pub use artworks::*;
pub use comments::*;
pub use events::*;
pub use reservations::*;
pub use workshops::*;

/// Shared transport: base address, HTTP client, session and invalidation bus
///
/// Clones are cheap and share everything.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base: Url,
    client_info: String,
    session: SessionHolder,
    bus: InvalidationBus,
}

impl Gateway {
    pub fn new(options: &ClientOptions, session: SessionHolder, bus: InvalidationBus) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let base = Url::parse(&options.api_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!("invalid API url: {}", options.api_url)));
        }
        Ok(Self {
            client,
            base,
            client_info: options.client_info.clone(),
            session,
            bus,
        })
    }

    pub fn session(&self) -> &SessionHolder {
        &self.session
    }

    pub fn bus(&self) -> &InvalidationBus {
        &self.bus
    }

    /// `{base}/api/{path}/`, always with a trailing slash
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/{}/",
            self.base.as_str().trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> FetchBuilder<'_> {
        let url = self.endpoint(path);
        FetchBuilder::new(&self.client, &url, method)
            .header("x-client-info", &self.client_info)
            .bearer_auth(self.session.token().as_deref())
    }

    pub(crate) fn get(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::GET, path)
    }

    pub(crate) fn post(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::POST, path)
    }

    pub(crate) fn put(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::PUT, path)
    }

    pub(crate) fn patch(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::PATCH, path)
    }

    pub(crate) fn delete(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::DELETE, path)
    }

    /// Execute and decode; a 401 on an authenticated request signs the user out
    pub(crate) async fn execute<T: DeserializeOwned>(&self, fetch: FetchBuilder<'_>) -> Result<T> {
        let authenticated = fetch.is_authenticated();
        let result = fetch.execute::<T>().await;
        self.check_auth(authenticated, result).await
    }

    pub(crate) async fn execute_empty(&self, fetch: FetchBuilder<'_>) -> Result<()> {
        let authenticated = fetch.is_authenticated();
        let result = fetch.execute_empty().await;
        self.check_auth(authenticated, result).await
    }

    async fn check_auth<T>(&self, authenticated: bool, result: Result<T>) -> Result<T> {
        if let Err(Error::Unauthorized(message)) = &result {
            if authenticated {
                warn!(%message, "Token rejected by the backend");
                self.session.revert(SignOutReason::TokenRejected).await?;
            }
        }
        result
    }

    /// GET a collection, accepting both a bare array and a paginated `{results}`
    pub(crate) async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let listing: Listing<T> = self.execute(self.get(path)).await?;
        Ok(listing.into_vec())
    }

    /// Fails locally when nobody is signed in
    pub(crate) fn require_login(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(Error::unauthorized("sign in required"))
        }
    }

    /// Role of the current viewer, fetching the profile if only the token is known
    pub(crate) async fn current_role(&self) -> Result<Option<Role>> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }
        if let Some(role) = self.session.role() {
            return Ok(Some(role));
        }
        debug!("Role unknown, fetching profile");
        let user: User = self.execute(self.get("myprofile")).await?;
        let role = user.category;
        self.session.update_user(user).await?;
        Ok(Some(role))
    }

    /// Role gate run before any gated request is built
    pub(crate) async fn require_role(&self, action: Action) -> Result<()> {
        if action != Action::Rate {
            self.require_login()?;
        }
        roles::ensure(self.current_role().await?, action)
    }

    pub(crate) fn publish(&self, mutation: Mutation) {
        self.bus.publish(mutation);
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Plain(items) | Self::Paged { results: items } => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use std::sync::Arc;

    fn gateway(url: &str) -> Gateway {
        let session = SessionHolder::new(Arc::new(MemorySessionStore::new()));
        let options = ClientOptions::default().with_api_url(url);
        Gateway::new(&options, session, InvalidationBus::new()).unwrap()
    }

    #[test]
    fn endpoints_end_with_a_slash() {
        let gw = gateway("http://localhost:8000/");
        assert_eq!(gw.endpoint("events"), "http://localhost:8000/api/events/");
        assert_eq!(
            gw.endpoint("/artworks/4/analyze/"),
            "http://localhost:8000/api/artworks/4/analyze/"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        let session = SessionHolder::new(Arc::new(MemorySessionStore::new()));
        let options = ClientOptions::default().with_api_url("not a url");
        assert!(Gateway::new(&options, session, InvalidationBus::new()).is_err());
    }

    #[test]
    fn listing_accepts_both_shapes() {
        let plain: Listing<i64> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(plain.into_vec(), vec![1, 2]);
        let paged: Listing<i64> =
            serde_json::from_str(r#"{"count": 1, "next": null, "results": [7]}"#).unwrap();
        assert_eq!(paged.into_vec(), vec![7]);
    }

    #[tokio::test]
    async fn anonymous_gated_calls_are_unauthorized() {
        let gw = gateway("http://localhost:8000");
        assert!(matches!(
            gw.require_role(Action::ManageEvents).await,
            Err(Error::Unauthorized(_))
        ));
        assert!(gw.require_role(Action::Rate).await.is_ok());
    }
}
