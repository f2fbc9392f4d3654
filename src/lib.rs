//! ArtFusion gallery client
//!
//! A typed async client for the ArtFusion gallery backend: events,
//! workshops, artworks, reservations and moderated comments, with a
//! session context, form validation and list stores that refetch when a
//! mutation makes them stale.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod forms;
pub mod models;
pub mod roles;
pub mod session;
pub mod store;
pub mod validation;
pub mod views;

use std::sync::Arc;

use tracing::debug;

use crate::api::{
    AiClient, ArtworkComments, ArtworksClient, CommentsClient, EventsClient, Gateway,
    ReservationsClient, WorkshopsClient,
};
use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::error::Result;
use crate::models::{Artwork, Comment, Event, Id, Reservation, Workshop};
use crate::session::{FileSessionStore, MemorySessionStore, SessionHolder, SessionStore};
use crate::store::{Collection, InvalidationBus, ListStore, Loader};
use crate::views::Viewer;

/// The main entry point for the ArtFusion client
#[derive(Clone)]
pub struct Gallery {
    gateway: Gateway,
    options: ClientOptions,
}

impl Gallery {
    /// Create a client, restoring any session kept by a previous run
    ///
    /// The session lives in a file when `persist_session` is set and in
    /// memory otherwise.
    ///
    /// # Arguments
    ///
    /// * `options` - Backend address, session persistence and timeouts
    ///
    /// # Example
    ///
    /// ```no_run
    /// use artfusion::{config::ClientOptions, Gallery};
    ///
    /// # async fn run() -> artfusion::error::Result<()> {
    /// let options = ClientOptions::default().with_api_url("http://localhost:8000");
    /// let gallery = Gallery::new(options).await?;
    /// for event in gallery.events().list().await? {
    ///     println!("{}", event.title);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(options: ClientOptions) -> Result<Self> {
        let store: Arc<dyn SessionStore> = if options.persist_session {
            Arc::new(FileSessionStore::new(options.resolved_session_file()?))
        } else {
            Arc::new(MemorySessionStore::new())
        };
        Self::with_store(options, store).await
    }

    /// Create a client on top of an explicit session store
    ///
    /// # Arguments
    ///
    /// * `options` - Client options; `persist_session` is ignored
    /// * `store` - Where the session is loaded from and saved to
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use artfusion::{config::ClientOptions, session::MemorySessionStore, Gallery};
    ///
    /// # async fn run() -> artfusion::error::Result<()> {
    /// let store = Arc::new(MemorySessionStore::new());
    /// let gallery = Gallery::with_store(ClientOptions::default(), store).await?;
    /// assert!(!gallery.session().is_authenticated());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_store(options: ClientOptions, store: Arc<dyn SessionStore>) -> Result<Self> {
        let session = SessionHolder::restore(store).await?;
        let gateway = Gateway::new(&options, session, InvalidationBus::new())?;
        debug!(api_url = %options.api_url, "Gallery client ready");
        Ok(Self { gateway, options })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionHolder {
        self.gateway.session()
    }

    pub fn bus(&self) -> &InvalidationBus {
        self.gateway.bus()
    }

    /// The current viewer, for building views
    ///
    /// Reports an anonymous viewer while the profile of a restored session
    /// is still unknown; see [`Gallery::resolve_viewer`].
    pub fn viewer(&self) -> Viewer {
        Viewer::from_session(self.session())
    }

    /// The current viewer, fetching the profile first when a restored
    /// session has a token but no user
    pub async fn resolve_viewer(&self) -> Result<Viewer> {
        self.gateway.current_role().await?;
        Ok(self.viewer())
    }

    pub fn auth(&self) -> Auth {
        Auth::new(self.gateway.clone())
    }

    pub fn events(&self) -> EventsClient {
        EventsClient::new(self.gateway.clone())
    }

    pub fn workshops(&self) -> WorkshopsClient {
        WorkshopsClient::new(self.gateway.clone())
    }

    pub fn artworks(&self) -> ArtworksClient {
        ArtworksClient::new(self.gateway.clone())
    }

    pub fn reservations(&self) -> ReservationsClient {
        ReservationsClient::new(self.gateway.clone())
    }

    pub fn comments(&self) -> CommentsClient {
        CommentsClient::new(self.gateway.clone())
    }

    pub fn ai(&self) -> AiClient {
        AiClient::new(self.gateway.clone())
    }

    /// Mounted list of events, refreshed whenever events go stale
    pub fn event_list(&self) -> Arc<ListStore<Event>> {
        self.mount(Collection::Events, Arc::new(self.events()))
    }

    pub fn workshop_list(&self) -> Arc<ListStore<Workshop>> {
        self.mount(Collection::Workshops, Arc::new(self.workshops()))
    }

    pub fn artwork_list(&self) -> Arc<ListStore<Artwork>> {
        self.mount(Collection::Artworks, Arc::new(self.artworks()))
    }

    pub fn reservation_list(&self) -> Arc<ListStore<Reservation>> {
        self.mount(Collection::Reservations, Arc::new(self.reservations()))
    }

    pub fn comment_list(&self) -> Arc<ListStore<Comment>> {
        self.mount(Collection::Comments, Arc::new(self.comments()))
    }

    /// Comment thread of a single artwork
    pub fn artwork_comment_list(&self, artwork_id: Id) -> Arc<ListStore<Comment>> {
        let loader = ArtworkComments::new(self.comments(), artwork_id);
        self.mount(Collection::Comments, Arc::new(loader))
    }

    /// Must be called from within a tokio runtime; the listener task ends
    /// when the store is unmounted or dropped.
    fn mount<T>(&self, collection: Collection, loader: Arc<dyn Loader<T>>) -> Arc<ListStore<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let store = Arc::new(ListStore::new(collection, loader));
        store.attach(self.bus());
        store
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::forms::*;
    pub use crate::models::*;
    pub use crate::roles::{Action, Role};
    pub use crate::store::{Collection, ListStore, RefreshOutcome};
    pub use crate::validation::Validate;
    pub use crate::views::{Control, Viewer};
    pub use crate::Gallery;
}
