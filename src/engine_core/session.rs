// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session Authority.
//!
//! Issues, validates and invalidates signed access tokens and owns the
//! in-memory session table. Sessions live until process exit; there is no
//! persistence and no background sweep. Expiry is evaluated lazily on
//! validation.
//!
//! The table is split into shards, each behind its own lock, so that
//! requests touching different sessions do not contend.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::engine_core::constants::{crypto, session};
use crate::engine_core::crypto::{TokenParts, TokenSigner};
use crate::engine_core::errors::WardenError;
use crate::engine_core::models::Session;
use crate::utils::time::{self, Clock, SystemClock};

/// Concurrency-safe map from session id to session, sharded by id.
pub struct SessionTable {
    shards: Vec<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionTable {
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count)
                .map(|_| RwLock::new(HashMap::new()))
                .collect(),
        }
    }

    fn shard(&self, id: &Uuid) -> &RwLock<HashMap<Uuid, Session>> {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.shards.len();
        &self.shards[idx]
    }

    pub fn insert(&self, session: Session) {
        self.shard(&session.session_id)
            .write()
            .insert(session.session_id, session);
    }

    pub fn get(&self, id: &Uuid) -> Option<Session> {
        self.shard(id).read().get(id).cloned()
    }

    /// Mark a session inactive. Returns whether it was found.
    pub fn deactivate(&self, id: &Uuid) -> bool {
        match self.shard(id).write().get_mut(id) {
            Some(session) => {
                session.active = false;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active sessions whose expiry has not been reached by the clock.
    pub fn count_live(&self, clock: &dyn Clock) -> usize {
        let now = clock.now();
        self.shards
            .iter()
            .map(|s| {
                s.read()
                    .values()
                    .filter(|session| session.active && !session.is_expired_at(now))
                    .count()
            })
            .sum()
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new(session::TABLE_SHARDS)
    }
}

pub struct SessionAuthority {
    signer: TokenSigner,
    table: SessionTable,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionAuthority {
    /// Authority with the default 24h lifetime and the wall clock.
    pub fn new(signer: TokenSigner) -> Self {
        Self::with_clock(
            signer,
            Duration::seconds(session::DEFAULT_TTL_SECS as i64),
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(signer: TokenSigner, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        // expires_at must always be strictly after created_at
        let ttl = if ttl <= Duration::zero() {
            Duration::seconds(1)
        } else {
            ttl
        };
        Self {
            signer,
            table: SessionTable::default(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new session for `user_id` and return it with its token.
    pub fn create(&self, user_id: &str) -> Result<Session, WardenError> {
        if user_id.is_empty() {
            return Err(WardenError::ValidationError(
                "User id cannot be empty".to_string(),
            ));
        }
        if user_id.contains(crypto::TOKEN_SEGMENT_SEPARATOR) {
            return Err(WardenError::ValidationError(
                "User id cannot contain '.'".to_string(),
            ));
        }

        let session_id = Uuid::new_v4();
        let created_at = time::truncate_to_seconds(self.clock.now());
        let expires_at = created_at + self.ttl;
        let access_token = self.signer.issue_token(
            &session_id.to_string(),
            user_id,
            time::unix_seconds(created_at),
        )?;

        let session = Session {
            session_id,
            user_id: user_id.to_string(),
            access_token,
            created_at,
            expires_at,
            active: true,
        };
        self.table.insert(session.clone());
        debug!(session_id = %session_id, "Session issued");
        Ok(session)
    }

    /// Validate an access token. Every failure collapses to `None`.
    pub fn validate(&self, token: &str) -> Option<Session> {
        let parts = match TokenParts::parse(token) {
            Some(p) => p,
            None => {
                debug!("Token rejected: malformed");
                return None;
            }
        };

        let session_id = match Uuid::parse_str(parts.session_id) {
            Ok(id) => id,
            Err(_) => {
                debug!("Token rejected: bad session id");
                return None;
            }
        };

        let session = match self.table.get(&session_id) {
            Some(s) => s,
            None => {
                debug!(session_id = %session_id, "Token rejected: unknown session");
                return None;
            }
        };

        if !session.active {
            debug!(session_id = %session_id, "Token rejected: session invalidated");
            return None;
        }
        if session.is_expired_at(self.clock.now()) {
            // Expiry is terminal even if the clock is later wound back.
            self.table.deactivate(&session_id);
            debug!(session_id = %session_id, "Token rejected: session expired");
            return None;
        }

        // Recompute from stored identity; only the timestamp comes from the token.
        if !self.signer.verify_token(
            token,
            &session.session_id.to_string(),
            &session.user_id,
            parts.timestamp,
        ) {
            debug!(session_id = %session_id, "Token rejected: signature mismatch");
            return None;
        }

        Some(session)
    }

    /// Invalidate a session. Idempotent; returns whether it exists.
    pub fn invalidate(&self, session_id: &Uuid) -> bool {
        let found = self.table.deactivate(session_id);
        debug!(session_id = %session_id, found, "Session invalidated");
        found
    }

    pub fn get(&self, session_id: &Uuid) -> Option<Session> {
        self.table.get(session_id)
    }

    pub fn active_count(&self) -> usize {
        self.table.count_live(self.clock.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::ManualClock;
    use chrono::{DateTime, Utc};

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn authority() -> (SessionAuthority, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let authority = SessionAuthority::with_clock(
            TokenSigner::from_secret("test-secret").unwrap(),
            Duration::hours(24),
            clock.clone(),
        );
        (authority, clock)
    }

    #[test]
    fn test_create_then_validate() {
        let (auth, _) = authority();
        let session = auth.create("alice").unwrap();

        assert!(session.expires_at > session.created_at);
        assert_eq!(session.expires_at - session.created_at, Duration::hours(24));

        let validated = auth.validate(&session.access_token).expect("token should validate");
        assert_eq!(validated.user_id, "alice");
        assert_eq!(validated.session_id, session.session_id);
    }

    #[test]
    fn test_token_format() {
        let (auth, _) = authority();
        let session = auth.create("alice").unwrap();
        let segments: Vec<&str> = session.access_token.split('.').collect();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], session.session_id.to_string());
        assert_eq!(
            segments[1],
            format!("alice:{}", session.created_at.timestamp())
        );
        assert_eq!(segments[2].len(), 64);
        assert!(segments[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_invalidate_is_terminal_and_idempotent() {
        let (auth, _) = authority();
        let session = auth.create("alice").unwrap();

        assert!(auth.invalidate(&session.session_id));
        assert!(auth.validate(&session.access_token).is_none());
        assert!(auth.invalidate(&session.session_id), "second call still finds it");
        assert!(auth.validate(&session.access_token).is_none());
        assert!(!auth.invalidate(&Uuid::new_v4()));
    }

    #[test]
    fn test_expiry_is_lazy_and_terminal() {
        let (auth, clock) = authority();
        let session = auth.create("alice").unwrap();

        clock.advance(Duration::hours(24));
        assert!(auth.validate(&session.access_token).is_some(), "now == expires_at is still valid");

        clock.advance(Duration::seconds(1));
        assert!(auth.validate(&session.access_token).is_none());

        clock.advance(Duration::hours(-48));
        assert!(auth.validate(&session.access_token).is_none(), "no resurrection");
        assert!(!auth.get(&session.session_id).unwrap().active);
    }

    #[test]
    fn test_unknown_and_malformed_tokens() {
        let (auth, _) = authority();
        assert!(auth.validate("").is_none());
        assert!(auth.validate("not-a-token").is_none());
        assert!(auth.validate("a.b.c.d").is_none());
        assert!(auth
            .validate(&format!("{}.alice:1.{}", Uuid::new_v4(), "00".repeat(32)))
            .is_none());
    }

    #[test]
    fn test_user_id_swap_rejected() {
        let (auth, _) = authority();
        let session = auth.create("alice").unwrap();
        let forged = session.access_token.replacen("alice", "mallo", 1);
        assert!(auth.validate(&forged).is_none());
    }

    #[test]
    fn test_foreign_signer_rejected() {
        let (auth, _) = authority();
        let session = auth.create("alice").unwrap();

        let other = SessionAuthority::new(TokenSigner::from_secret("other-secret").unwrap());
        assert!(other.validate(&session.access_token).is_none());
    }

    #[test]
    fn test_rejects_unroutable_user_ids() {
        let (auth, _) = authority();
        assert!(auth.create("").is_err());
        assert!(auth.create("alice.smith").is_err());
        assert!(auth.create("urn:user:7").is_ok());
    }

    #[test]
    fn test_active_count() {
        let (auth, clock) = authority();
        let a = auth.create("alice").unwrap();
        auth.create("bob").unwrap();
        assert_eq!(auth.active_count(), 2);
        auth.invalidate(&a.session_id);
        assert_eq!(auth.active_count(), 1);
        clock.advance(Duration::days(2));
        assert_eq!(auth.active_count(), 0);
    }

    #[test]
    fn test_non_positive_ttl_is_clamped() {
        let clock = Arc::new(ManualClock::new(start()));
        let auth = SessionAuthority::with_clock(
            TokenSigner::from_secret("s").unwrap(),
            Duration::zero(),
            clock,
        );
        let session = auth.create("alice").unwrap();
        assert!(session.expires_at > session.created_at);
    }

    #[test]
    fn test_table_shards_spread() {
        let table = SessionTable::new(4);
        assert!(table.is_empty());
        let now = Utc::now();
        for i in 0..64 {
            table.insert(Session {
                session_id: Uuid::new_v4(),
                user_id: format!("user{}", i),
                access_token: String::new(),
                created_at: now,
                expires_at: now + Duration::hours(1),
                active: true,
            });
        }
        assert_eq!(table.len(), 64);
        assert!(table.shards.iter().filter(|s| !s.read().is_empty()).count() > 1);
    }
}
