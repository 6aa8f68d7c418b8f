//! Trust store and local policy types (§4.7/§4.8/§6): read-only inputs to
//! the verifier. The compiler embeds a snapshot of both under
//! `governance/` for audit purposes, but the embedded snapshot never
//! participates in a verifier's actual trust decision — that comes only
//! from the `TrustStoreV1` the verifier's caller supplies directly,
//! exactly as original §6 frames it ("consumed read-only by the
//! verifier", not authored by the shard it ships alongside).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The set of publisher public keys (lowercase hex, 32 raw bytes) a
/// verifier will accept a signature from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustStoreV1 {
    pub allowed_keys: BTreeSet<String>,
}

impl TrustStoreV1 {
    #[must_use]
    pub fn new(allowed_keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed_keys: allowed_keys.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn allows(&self, publisher_hex: &str) -> bool {
        self.allowed_keys.contains(publisher_hex)
    }
}

/// Opaque, passthrough local policy: the umbrella policy schema is out of
/// scope for this workspace (original §1 Out of scope), so this crate
/// never interprets `local_policy.json` beyond carrying it verbatim
/// through the shard's governance directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalPolicyV1(pub serde_json::Value);

impl LocalPolicyV1 {
    #[must_use]
    pub fn empty() -> Self {
        Self(serde_json::json!({}))
    }
}
