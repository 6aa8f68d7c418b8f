//! `manifest.json` (§4.7): the shard's single normative metadata file —
//! `spec` version, injectable `created` timestamp, `capsule_hash`,
//! `merkle_root`, and the publisher's public key in hex. Serialized
//! exclusively through `flashfreeze_kernel::json::canonical_json_file_bytes`
//! so the byte form is sorted-keys, no-whitespace, LF-terminated by
//! construction rather than by convention.

use flashfreeze_kernel::hash::ContentHash;
use flashfreeze_kernel::json::{canonical_json_file_bytes, CanonJsonError};

/// The spec version this manifest format implements.
pub const MANIFEST_SPEC_VERSION: &str = "flash-freeze/1";

/// A shard's manifest (§4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub spec_version: String,
    pub created: String,
    pub capsule_hash: ContentHash,
    pub merkle_root: String,
    pub publisher_public_key_hex: String,
}

/// Error building or parsing a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// Canonical JSON serialization failed.
    CanonError { detail: String },
    /// `manifest.json` bytes failed to parse as JSON, or a required field
    /// was missing or the wrong type.
    Invalid { detail: String },
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CanonError { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::Invalid { detail } => write!(f, "invalid manifest: {detail}"),
        }
    }
}

impl std::error::Error for ManifestError {}

impl From<CanonJsonError> for ManifestError {
    fn from(e: CanonJsonError) -> Self {
        Self::CanonError {
            detail: e.to_string(),
        }
    }
}

impl Manifest {
    /// Serialize to the exact on-disk bytes of `manifest.json` (§4.7:
    /// UTF-8, LF line endings, sorted keys, no trailing whitespace).
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::CanonError`] if canonicalization fails
    /// (unreachable for the field set built here, since every value is a
    /// string, but the signature stays fallible to match every other
    /// canonical-JSON producer in this workspace).
    pub fn to_bytes(&self) -> Result<Vec<u8>, ManifestError> {
        let value = serde_json::json!({
            "spec": self.spec_version,
            "created": self.created,
            "capsule_hash": self.capsule_hash.as_str(),
            "merkle_root": self.merkle_root,
            "publisher_public_key": self.publisher_public_key_hex,
        });
        Ok(canonical_json_file_bytes(&value)?)
    }

    /// Parse a manifest back from its on-disk bytes.
    ///
    /// Does not require the bytes to already be in canonical form. The
    /// verifier calls `flashfreeze_kernel::json::verify_canonical`
    /// separately, but only after the signature check: a repacked
    /// manifest fails on its signature (computed over the original
    /// canonical bytes, not the repacked ones) before canonicality is
    /// ever asserted.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] if the bytes are not valid JSON
    /// or a required field is missing/mistyped.
    pub fn parse(bytes: &[u8]) -> Result<Self, ManifestError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| ManifestError::Invalid {
                detail: format!("JSON parse failed: {e}"),
            })?;
        let field = |name: &str| -> Result<String, ManifestError> {
            value
                .get(name)
                .and_then(serde_json::Value::as_str)
                .map(std::string::ToString::to_string)
                .ok_or_else(|| ManifestError::Invalid {
                    detail: format!("missing or non-string field {name:?}"),
                })
        };
        let capsule_hash_str = field("capsule_hash")?;
        let capsule_hash = ContentHash::parse(&capsule_hash_str).ok_or_else(|| ManifestError::Invalid {
            detail: format!("malformed capsule_hash: {capsule_hash_str:?}"),
        })?;
        Ok(Self {
            spec_version: field("spec")?,
            created: field("created")?,
            capsule_hash,
            merkle_root: field("merkle_root")?,
            publisher_public_key_hex: field("publisher_public_key")?,
        })
    }
}
