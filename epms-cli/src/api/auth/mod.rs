//! Authentication session
//!
//! The session is an explicit object handed to the request pipeline and to the
//! CLI composition root. It moves between two states: anonymous (no token) and
//! authenticated (token plus decoded user). Only [`AuthContext::login`] and
//! [`AuthContext::logout`] change it; everything else reads a snapshot.

pub mod store;
pub mod token;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use token::{AuthUser, decode_token, encode_unsigned_token};

use anyhow::Result;
use arc_swap::ArcSwap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bearer token together with the identity it carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Decode `raw` and build an authenticated session from it
    pub fn from_token(raw: &str) -> Result<Self> {
        let user = decode_token(raw)?;
        Ok(Self {
            token: Some(raw.trim().to_string()),
            user: Some(user),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Holder of the current session and its durable store
pub struct AuthContext {
    session: ArcSwap<AuthSession>,
    store: Box<dyn SessionStore>,
}

impl AuthContext {
    /// Anonymous context backed by `store`; nothing is read from it
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            session: ArcSwap::from_pointee(AuthSession::anonymous()),
            store: Box::new(store),
        }
    }

    /// Anonymous context that persists nothing beyond the process
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    /// Context seeded from whatever `store` holds. An unreadable session is
    /// discarded and the context starts anonymous.
    pub fn restore(store: impl SessionStore + 'static) -> Self {
        let context = Self::new(store);
        match context.store.load() {
            Ok(Some(session)) if session.is_authenticated() => {
                if let Some(ref user) = session.user {
                    info!("Restored session for {}", user.username);
                }
                context.session.store(Arc::new(session));
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Discarding stored session: {:#}", e);
                if let Err(e) = context.store.clear() {
                    warn!("Failed to remove stored session: {:#}", e);
                }
            }
        }
        context
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Arc<AuthSession> {
        self.session.load_full()
    }

    pub fn token(&self) -> Option<String> {
        self.session.load().token.clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.session.load().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.load().is_authenticated()
    }

    /// Whether the signed-in user holds at least one of `roles`
    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        self.session
            .load()
            .user
            .as_ref()
            .is_some_and(|user| user.has_any_role(roles))
    }

    /// Decode `raw_token`, make it the current session and persist it.
    /// No server round trip happens here.
    pub fn login(&self, raw_token: &str) -> Result<AuthUser> {
        let user = decode_token(raw_token)?;
        let session = AuthSession {
            token: Some(raw_token.trim().to_string()),
            user: Some(user.clone()),
        };
        self.store.save(&session)?;

        info!("Logged in as {} ({} roles)", user.username, user.roles.len());
        self.session.store(Arc::new(session));
        Ok(user)
    }

    /// Return to the anonymous state and erase the persisted session
    pub fn logout(&self) -> Result<()> {
        let previous = self.session.swap(Arc::new(AuthSession::anonymous()));
        if let Some(ref user) = previous.user {
            info!("Logged out {}", user.username);
        }
        self.store.clear()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session.load();
        f.debug_struct("AuthContext")
            .field("authenticated", &session.is_authenticated())
            .field("user", &session.user.as_ref().map(|u| u.username.as_str()))
            .finish()
    }
}
