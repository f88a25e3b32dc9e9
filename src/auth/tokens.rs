//! Bearer session tokens.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::users::UserClaims;

struct Session {
    claims: UserClaims,
    expires_at: Instant,
}

/// Issues opaque tokens and resolves them back to user claims.
#[derive(Clone)]
pub struct TokenStore {
    sessions: Arc<DashMap<Uuid, Session>>,
    ttl: Duration,
}

impl TokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Issue a new token for a user.
    pub fn issue(&self, claims: UserClaims) -> String {
        let token = Uuid::new_v4();
        self.sessions.insert(
            token,
            Session {
                claims,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token.to_string()
    }

    /// Claims for a live token. Expired tokens are dropped on lookup.
    pub fn verify(&self, token: &str) -> Option<UserClaims> {
        let id = Uuid::parse_str(token.trim()).ok()?;
        let now = Instant::now();

        let claims = {
            let session = self.sessions.get(&id)?;
            (session.expires_at > now).then(|| session.claims.clone())
        };
        if claims.is_none() {
            self.sessions.remove(&id);
        }
        claims
    }

    /// Drop every expired session; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at > now);
        before - self.sessions.len()
    }

    /// Sessions currently held, expired or not.
    pub fn active(&self) -> usize {
        self.sessions.len()
    }
}
