//! Session context: who is signed in, and with which token
//!
//! The holder is created once at startup from a [`SessionStore`], injected
//! into the gateway, and moves between two states:
//!
//! * **anonymous**: no token, public endpoints only
//! * **authenticated**: a bearer token (and usually the user profile)
//!
//! A successful login moves to authenticated. Logout, or any protected call
//! answered with 401, clears the store and moves back to anonymous. There is
//! no automatic token refresh.

mod store;
pub mod token;

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::User;
use crate::roles::Role;

pub use store::*;

/// Credentials of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            user: stored.user,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            user: session.user.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

/// Why the session went back to anonymous
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    Logout,
    TokenRejected,
    TokenExpired,
}

/// Broadcast to subscribers on every transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: Option<i64> },
    ProfileUpdated { user_id: i64 },
    SignedOut { reason: SignOutReason },
}

/// Shared handle on the session; clones see the same state
#[derive(Clone)]
pub struct SessionHolder {
    state: Arc<RwLock<SessionState>>,
    store: Arc<dyn SessionStore>,
    changes: broadcast::Sender<SessionEvent>,
}

impl SessionHolder {
    /// Start anonymous, without reading the store
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            state: Arc::new(RwLock::new(SessionState::Anonymous)),
            store,
            changes,
        }
    }

    /// Build the holder from whatever the store kept from a previous run
    ///
    /// A token whose `exp` has passed is discarded and the store cleared.
    pub async fn restore(store: Arc<dyn SessionStore>) -> Result<Self> {
        let holder = Self::new(store);
        if let Some(stored) = holder.store.load().await? {
            if token::is_expired(&stored.access_token, Utc::now()) {
                info!("Stored token has expired, starting anonymous");
                holder.store.clear().await?;
            } else {
                info!("Restored session from storage");
                holder.set_state(SessionState::Authenticated(stored.into()));
            }
        }
        Ok(holder)
    }

    pub fn state(&self) -> SessionState {
        self.read(|state| state.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|state| matches!(state, SessionState::Authenticated(_)))
    }

    /// Bearer token to attach, if any
    pub fn token(&self) -> Option<String> {
        self.read(|state| match state {
            SessionState::Authenticated(session) => Some(session.access_token.clone()),
            SessionState::Anonymous => None,
        })
    }

    pub fn user(&self) -> Option<User> {
        self.read(|state| match state {
            SessionState::Authenticated(session) => session.user.clone(),
            SessionState::Anonymous => None,
        })
    }

    /// Role of the signed-in user; `None` when anonymous or the profile is unknown
    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.category)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.changes.subscribe()
    }

    /// Anonymous → authenticated
    pub async fn establish(&self, session: Session) -> Result<()> {
        self.store.save(&StoredSession::from(&session)).await?;
        let user_id = session.user.as_ref().map(|user| user.id);
        self.set_state(SessionState::Authenticated(session));
        info!(?user_id, "Session established");
        self.notify(SessionEvent::SignedIn { user_id });
        Ok(())
    }

    /// Store a freshly fetched profile; ignored while anonymous
    pub async fn update_user(&self, user: User) -> Result<()> {
        let updated = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match &mut *guard {
                SessionState::Authenticated(session) => {
                    session.user = Some(user.clone());
                    Some(StoredSession::from(&*session))
                }
                SessionState::Anonymous => None,
            }
        };
        if let Some(stored) = updated {
            self.store.save(&stored).await?;
            self.notify(SessionEvent::ProfileUpdated { user_id: user.id });
        }
        Ok(())
    }

    /// Authenticated → anonymous, clearing persisted credentials
    pub async fn revert(&self, reason: SignOutReason) -> Result<()> {
        let was_authenticated = self.is_authenticated();
        self.set_state(SessionState::Anonymous);
        self.store.clear().await?;
        if was_authenticated {
            match reason {
                SignOutReason::Logout => info!("Signed out"),
                SignOutReason::TokenRejected | SignOutReason::TokenExpired => {
                    warn!(?reason, "Session reverted to anonymous")
                }
            }
            self.notify(SessionEvent::SignedOut { reason });
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn notify(&self, event: SessionEvent) {
        // no receivers is fine
        let _ = self.changes.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor() -> User {
        User {
            id: 3,
            email: "leo@example.com".to_string(),
            first_name: "Léo".to_string(),
            last_name: "Martin".to_string(),
            category: Role::Visiteur,
            phone: None,
            profile_picture: None,
            artistic_nickname: None,
        }
    }

    #[tokio::test]
    async fn login_then_logout_cycles_state_and_store() {
        let store = Arc::new(MemorySessionStore::new());
        let holder = SessionHolder::restore(store.clone()).await.unwrap();
        let mut events = holder.subscribe();
        assert_eq!(holder.state(), SessionState::Anonymous);
        assert_eq!(holder.role(), None);

        holder
            .establish(Session {
                access_token: "tok".to_string(),
                refresh_token: None,
                user: Some(visitor()),
            })
            .await
            .unwrap();
        assert_eq!(holder.token().as_deref(), Some("tok"));
        assert_eq!(holder.role(), Some(Role::Visiteur));
        assert!(store.load().await.unwrap().is_some());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedIn { user_id: Some(3) }
        );

        holder.revert(SignOutReason::Logout).await.unwrap();
        assert!(!holder.is_authenticated());
        assert!(holder.token().is_none());
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedOut {
                reason: SignOutReason::Logout
            }
        );
    }

    #[tokio::test]
    async fn restore_keeps_live_token() {
        let token = token::mint(Utc::now().timestamp() + 600);
        let store = Arc::new(MemorySessionStore::with_session(StoredSession {
            access_token: token.clone(),
            refresh_token: None,
            user: Some(visitor()),
        }));
        let holder = SessionHolder::restore(store).await.unwrap();
        assert_eq!(holder.token(), Some(token));
        assert_eq!(holder.user().map(|u| u.id), Some(3));
    }

    #[tokio::test]
    async fn restore_drops_expired_token() {
        let store = Arc::new(MemorySessionStore::with_session(StoredSession {
            access_token: token::mint(Utc::now().timestamp() - 60),
            refresh_token: None,
            user: None,
        }));
        let holder = SessionHolder::restore(store.clone()).await.unwrap();
        assert!(!holder.is_authenticated());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_user_is_ignored_when_anonymous() {
        let store = Arc::new(MemorySessionStore::new());
        let holder = SessionHolder::new(store.clone());
        holder.update_user(visitor()).await.unwrap();
        assert!(holder.user().is_none());
        assert!(store.load().await.unwrap().is_none());
    }
}
