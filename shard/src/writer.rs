//! Shard writer (C7, §4.7): lays out the shard tree in a fixed directory
//! order, writes the columnar evidence tables, folds the Merkle root,
//! and signs `manifest.json` last as the shard's commit point.
//!
//! Modeled on the teacher's `write_bundle_dir` in `bundle_dir.rs`: every
//! file is written through [`write_atomic`] (temp file + rename), and the
//! directory is never left half-committed from the verifier's point of
//! view — the signature file closes it.

use std::path::Path;

use ed25519_dalek::SigningKey;

use flashfreeze_judge::graph::GraphRowSets;
use flashfreeze_judge::rows::StreamRow;
use flashfreeze_kernel::hash::ContentHash;
use flashfreeze_kernel::json::{canonical_json_file_bytes, CanonJsonError};

use crate::clock::Clock;
use crate::columnar::{claims, entities, provenance, spans, streams, ColumnarWriteError};
use crate::manifest::{Manifest, ManifestError, MANIFEST_SPEC_VERSION};
use crate::merkle::{build_merkle_tree, MerkleError};
use crate::sign::sign;
use crate::trust::{LocalPolicyV1, TrustStoreV1};

/// Everything the writer needs from the compile pipeline's upstream
/// stages (C2 through C6), borrowed for the duration of one write.
pub struct ShardSource<'a> {
    pub events_bytes: &'a [u8],
    pub capsule_hash: &'a ContentHash,
    pub graph: &'a GraphRowSets,
    pub stream_rows: &'a [StreamRow],
}

/// Error emitting a shard (original §4.7/§7: `IoError`, `SigningError`,
/// `NonDeterministicLibrary`).
#[derive(Debug)]
pub enum WriteError {
    Io { detail: String },
    Columnar(ColumnarWriteError),
    Merkle(MerkleError),
    Manifest(ManifestError),
    /// The written shard tree has no hashable files at all — should be
    /// unreachable, since `content/events.jsonl` is always written first.
    EmptyShard,
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::Columnar(e) => write!(f, "columnar write error: {e}"),
            Self::Merkle(e) => write!(f, "merkle error: {e}"),
            Self::Manifest(e) => write!(f, "manifest error: {e}"),
            Self::EmptyShard => write!(f, "shard tree has no hashable files"),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<ColumnarWriteError> for WriteError {
    fn from(e: ColumnarWriteError) -> Self {
        Self::Columnar(e)
    }
}

impl From<MerkleError> for WriteError {
    fn from(e: MerkleError) -> Self {
        Self::Merkle(e)
    }
}

impl From<ManifestError> for WriteError {
    fn from(e: ManifestError) -> Self {
        Self::Manifest(e)
    }
}

impl From<CanonJsonError> for WriteError {
    fn from(e: CanonJsonError) -> Self {
        Self::Manifest(ManifestError::from(e))
    }
}

/// Write a complete shard to `shard_dir`, which must not already exist
/// (or must be empty) — the writer never merges into a populated
/// directory.
///
/// Directory entries are created in a fixed order: `content/`, `graph/`,
/// `evidence/`, `governance/`, then `manifest.json`, then `sig/` last.
///
/// # Errors
///
/// Returns [`WriteError`] on any I/O failure, a non-deterministic
/// columnar encoding, or a signing failure.
pub fn write_shard(
    shard_dir: &Path,
    source: &ShardSource<'_>,
    signing_key: &SigningKey,
    trust_store: &TrustStoreV1,
    local_policy: &LocalPolicyV1,
    clock: &dyn Clock,
) -> Result<(), WriteError> {
    create_dir(shard_dir)?;

    let content_dir = shard_dir.join("content");
    create_dir(&content_dir)?;
    write_atomic(content_dir.join("events.jsonl"), source.events_bytes)?;

    let graph_dir = shard_dir.join("graph");
    create_dir(&graph_dir)?;
    entities::write(&graph_dir.join("entities.parquet"), &source.graph.entities)?;
    claims::write(&graph_dir.join("claims.parquet"), &source.graph.claims)?;
    provenance::write(&graph_dir.join("provenance.parquet"), &source.graph.provenance)?;

    let evidence_dir = shard_dir.join("evidence");
    create_dir(&evidence_dir)?;
    spans::write(&evidence_dir.join("spans.parquet"), &source.graph.spans)?;
    streams::write(&evidence_dir.join("streams.parquet"), source.stream_rows)?;

    let governance_dir = shard_dir.join("governance");
    create_dir(&governance_dir)?;
    write_atomic(
        governance_dir.join("trust_store.json"),
        &canonical_json_file_bytes(&serde_json::to_value(trust_store).map_err(|e| {
            WriteError::Io {
                detail: format!("serializing trust store: {e}"),
            }
        })?)?,
    )?;
    write_atomic(
        governance_dir.join("local_policy.json"),
        &canonical_json_file_bytes(&local_policy.0)?,
    )?;

    let (_, merkle_root) = build_merkle_tree(shard_dir)?;
    let merkle_root = merkle_root.ok_or(WriteError::EmptyShard)?;

    let manifest = Manifest {
        spec_version: MANIFEST_SPEC_VERSION.to_string(),
        created: clock.now(),
        capsule_hash: source.capsule_hash.clone(),
        merkle_root: format!("blake3:{}", merkle_root.to_hex()),
        publisher_public_key_hex: hex::encode(signing_key.verifying_key().to_bytes()),
    };
    let manifest_bytes = manifest.to_bytes()?;
    write_atomic(shard_dir.join("manifest.json"), &manifest_bytes)?;

    let sig_dir = shard_dir.join("sig");
    create_dir(&sig_dir)?;
    write_atomic(sig_dir.join("publisher.pub"), &signing_key.verifying_key().to_bytes())?;
    let signature = sign(signing_key, &manifest_bytes);
    write_atomic(sig_dir.join("manifest.sig"), &signature)?;

    Ok(())
}

fn create_dir(path: &Path) -> Result<(), WriteError> {
    std::fs::create_dir_all(path).map_err(|e| WriteError::Io {
        detail: format!("create_dir_all {}: {e}", path.display()),
    })
}

/// Write bytes to a path via temp file + rename, matching the teacher's
/// `write_atomic` in `bundle_dir.rs`.
fn write_atomic(path: impl AsRef<Path>, content: &[u8]) -> Result<(), WriteError> {
    let path = path.as_ref();
    let dir = path.parent().ok_or_else(|| WriteError::Io {
        detail: format!("{}: no parent directory", path.display()),
    })?;
    let temp_name = format!(".tmp_{}", path.file_name().unwrap_or_default().to_string_lossy());
    let temp_path = dir.join(temp_name);

    std::fs::write(&temp_path, content).map_err(|e| WriteError::Io {
        detail: format!("writing {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| WriteError::Io {
        detail: format!("rename {} -> {}: {e}", temp_path.display(), path.display()),
    })?;
    Ok(())
}
