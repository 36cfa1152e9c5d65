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

//! Cryptographic utilities for session tokens.
//!
//! This module provides the `TokenSigner` which computes and verifies the
//! HMAC-SHA256 signatures binding an access token to its session.
//!
//! Token format: `"{session_id}.{user_id}:{timestamp}.{hex_signature}"` where
//! the signature covers `"{session_id}.{user_id}:{timestamp}"`.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::engine_core::constants::crypto;
use crate::engine_core::errors::{CryptoError, WardenError};
use crate::utils::security::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// The three parts of a well-formed access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParts<'a> {
    pub session_id: &'a str,
    pub user_id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

impl<'a> TokenParts<'a> {
    /// Split a token into its segments. Anything but exactly three
    /// dot-delimited segments, or a payload without a colon, is rejected.
    pub fn parse(token: &'a str) -> Option<Self> {
        let segments: Vec<&str> = token.split(crypto::TOKEN_SEGMENT_SEPARATOR).collect();
        if segments.len() != crypto::TOKEN_SEGMENTS {
            return None;
        }
        let (user_id, timestamp) = segments[1].rsplit_once(crypto::TOKEN_PAYLOAD_SEPARATOR)?;
        Some(Self {
            session_id: segments[0],
            user_id,
            timestamp,
            signature: segments[2],
        })
    }
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Create a new signer with a random ephemeral key.
    ///
    /// Tokens signed by it do not survive a process restart.
    pub fn try_new() -> Result<Self, WardenError> {
        let mut secret = vec![0u8; crypto::SECRET_KEY_LENGTH];
        rand::rng().fill(secret.as_mut_slice());
        Ok(Self {
            secret: Zeroizing::new(secret),
        })
    }

    /// Create a signer from an externally supplied secret.
    pub fn from_secret(secret: &str) -> Result<Self, WardenError> {
        if secret.is_empty() {
            return Err(WardenError::CryptoError(CryptoError::EmptySecret));
        }
        Ok(Self {
            secret: Zeroizing::new(secret.as_bytes().to_vec()),
        })
    }

    /// Payload covered by the signature.
    pub fn payload(session_id: &str, user_id: &str, timestamp: &str) -> String {
        format!(
            "{}{}{}{}{}",
            session_id,
            crypto::TOKEN_SEGMENT_SEPARATOR,
            user_id,
            crypto::TOKEN_PAYLOAD_SEPARATOR,
            timestamp
        )
    }

    /// Hex-encoded HMAC-SHA256 of `payload`.
    pub fn sign(&self, payload: &str) -> Result<String, WardenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| WardenError::CryptoError(CryptoError::HashingError(e.to_string())))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build the full access token for a session.
    pub fn issue_token(
        &self,
        session_id: &str,
        user_id: &str,
        timestamp: i64,
    ) -> Result<String, WardenError> {
        let timestamp = timestamp.to_string();
        let payload = Self::payload(session_id, user_id, &timestamp);
        let signature = self.sign(&payload)?;
        Ok(format!(
            "{}{}{}",
            payload,
            crypto::TOKEN_SEGMENT_SEPARATOR,
            signature
        ))
    }

    /// Recompute the token for the given identity and timestamp segment and
    /// compare it to `presented` in constant time.
    pub fn verify_token(
        &self,
        presented: &str,
        session_id: &str,
        user_id: &str,
        timestamp: &str,
    ) -> bool {
        let payload = Self::payload(session_id, user_id, timestamp);
        let signature = match self.sign(&payload) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        let expected = format!(
            "{}{}{}",
            payload,
            crypto::TOKEN_SEGMENT_SEPARATOR,
            signature
        );
        constant_time_eq(expected.as_bytes(), presented.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_deterministic() {
        let signer = TokenSigner::from_secret("server-secret").unwrap();
        let a = signer.sign("sid.alice:1700000000").unwrap();
        let b = signer.sign("sid.alice:1700000000").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64, "HMAC-SHA256 hex should be 64 characters");
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let a = TokenSigner::from_secret("one").unwrap();
        let b = TokenSigner::from_secret("two").unwrap();
        assert_ne!(a.sign("payload").unwrap(), b.sign("payload").unwrap());
    }

    #[test]
    fn test_signature_matches_reference_hmac() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let signer = TokenSigner::from_secret("key").unwrap();
        assert_eq!(
            signer
                .sign("The quick brown fox jumps over the lazy dog")
                .unwrap(),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = TokenSigner::try_new().unwrap();
        let token = signer.issue_token("sid", "alice", 1_700_000_000).unwrap();
        assert!(token.starts_with("sid.alice:1700000000."));

        let parts = TokenParts::parse(&token).unwrap();
        assert!(signer.verify_token(&token, parts.session_id, parts.user_id, parts.timestamp));
        assert!(!signer.verify_token(&token, "sid", "mallory", parts.timestamp));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(TokenSigner::from_secret("").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_segment_count() {
        assert!(TokenParts::parse("").is_none());
        assert!(TokenParts::parse("a.b").is_none());
        assert!(TokenParts::parse("a.b:1.c.d").is_none());
        assert!(TokenParts::parse("a.b.c").is_none(), "payload needs a colon");
    }

    #[test]
    fn test_parse_splits_on_last_colon() {
        let parts = TokenParts::parse("sid.urn:user:7:1700000000.sig").unwrap();
        assert_eq!(parts.user_id, "urn:user:7");
        assert_eq!(parts.timestamp, "1700000000");
    }
}
