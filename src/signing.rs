//! HMAC-SHA256 request signing for the HTTP bridge.
//!
//! The bridge authenticates a request by recomputing
//! `HMAC[SHA256]_{secret}(key | timestamp | seq | nonce | body)` and
//! comparing it with the `signature` query parameter. Everything needed to
//! repeat the computation travels alongside it in the query string.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::config::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// Upper bound (inclusive) of a nonce.
pub const MAX_NONCE: u64 = 1 << 53;

/// Source of per-request nonces.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> u64;
}

/// Uniformly random nonces in `[0, 2^53]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn next_nonce(&self) -> u64 {
        rand::rng().random_range(0..=MAX_NONCE)
    }
}

/// Formats a UTC instant the way the bridge expects, e.g.
/// `2024-01-02T03:04:05.000006Z`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Computes the URL-safe base64 HMAC-SHA256 signature of a request.
pub fn sign(
    secret: &[u8],
    key: &str,
    sequence: u64,
    nonce: u64,
    timestamp: &str,
    body: &[u8],
) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take any size");
    mac.update(key.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(sequence.to_string().as_bytes());
    mac.update(nonce.to_string().as_bytes());
    mac.update(body);
    URL_SAFE.encode(mac.finalize().into_bytes())
}

/// The query parameters attached to a signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
    pub timestamp: String,
    pub sequence: u64,
    pub nonce: u64,
    pub signature: String,
    pub key: String,
}

impl SignedRequest {
    /// Query pairs in wire order.
    pub fn query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("timestamp", self.timestamp.clone()),
            ("seq", self.sequence.to_string()),
            ("nonce", self.nonce.to_string()),
            ("signature", self.signature.clone()),
            ("key", self.key.clone()),
        ]
    }
}

/// Signs request bodies with one set of credentials.
#[derive(Clone)]
pub struct Signer {
    credentials: Credentials,
    nonces: Arc<dyn NonceSource>,
}

impl Signer {
    pub fn new(credentials: Credentials, nonces: Arc<dyn NonceSource>) -> Self {
        Self { credentials, nonces }
    }

    pub fn key(&self) -> &str {
        &self.credentials.key
    }

    /// Signs `body` for `sequence` at the current time with a fresh nonce.
    pub fn sign_body(&self, sequence: u64, body: &[u8]) -> SignedRequest {
        self.sign_body_at(Utc::now(), sequence, body)
    }

    pub fn sign_body_at(&self, now: DateTime<Utc>, sequence: u64, body: &[u8]) -> SignedRequest {
        let timestamp = timestamp(now);
        let nonce = self.nonces.next_nonce();
        let signature = sign(
            &self.credentials.secret,
            &self.credentials.key,
            sequence,
            nonce,
            &timestamp,
            body,
        );
        SignedRequest {
            timestamp,
            sequence,
            nonce,
            signature,
            key: self.credentials.key.clone(),
        }
    }
}
