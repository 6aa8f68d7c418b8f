//! Content hashing primitives.
//!
//! Two algorithms are used for two distinct purposes, mirroring the
//! teacher's own split (`sha2` for all V1 content hashes, with a note
//! reserving `blake3` "for future V2"): canonical ID minting and the
//! capsule/source hash (§4.1, §4.2) are SHA-256; the Merkle tree over the
//! shard's file bytes and per-record content hashes (§4.4, §4.7) are
//! BLAKE3, since those are the new, wide, parallel-hashing surfaces the
//! original spec calls out explicitly by name.

use sha2::{Digest, Sha256};

/// A content-addressed hash with an explicit algorithm tag.
///
/// Canonical string form: `"algorithm:hex_digest"` (e.g. `"sha256:abc..."`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    full: String,
    colon: usize,
}

impl ContentHash {
    /// Parse from `"algorithm:hex_digest"` form.
    ///
    /// Validation: exactly one `:` separator; non-empty lowercase
    /// alphanumeric algorithm; non-empty lowercase hex digest.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let colon = s.find(':')?;
        if s[colon + 1..].contains(':') {
            return None;
        }
        let algorithm = &s[..colon];
        let digest = &s[colon + 1..];

        if algorithm.is_empty()
            || !algorithm
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return None;
        }
        if digest.is_empty()
            || !digest
                .bytes()
                .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
        {
            return None;
        }

        Some(Self {
            full: s.to_string(),
            colon,
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.full[..self.colon]
    }

    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.full[self.colon + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }

    fn from_sha256(digest: &[u8]) -> Self {
        let full = format!("sha256:{}", hex::encode(digest));
        Self { full, colon: 6 }
    }

    fn from_blake3(hash: &blake3::Hash) -> Self {
        let full = format!("blake3:{}", hash.to_hex());
        Self { full, colon: 6 }
    }
}

/// SHA-256 of `data`, with no domain separation. Used for the capsule
/// `source_hash` (§4.2) — the capsule producer is a separate trust
/// boundary from the compiler's own claims, so we hash exactly the bytes
/// on disk with no prefix.
#[must_use]
pub fn sha256_content_hash(data: &[u8]) -> ContentHash {
    let digest = Sha256::digest(data);
    ContentHash::from_sha256(&digest)
}

/// BLAKE3 of `data`, with no domain separation. Used for per-record
/// `content_hash` values (§4.4: `content_hash = BLAKE3(payload)`).
#[must_use]
pub fn blake3_content_hash(data: &[u8]) -> ContentHash {
    ContentHash::from_blake3(&blake3::hash(data))
}

/// Raw BLAKE3 digest of `data`, for callers (the Merkle fold) that need
/// the 32-byte hash rather than the tagged [`ContentHash`] string form.
#[must_use]
pub fn blake3_raw(data: &[u8]) -> blake3::Hash {
    blake3::hash(data)
}

/// Tag an already-computed BLAKE3 digest as a [`ContentHash`], for
/// callers (the binary scanners) that hash a payload once and need both
/// the raw hash and its tagged string form.
#[must_use]
pub fn tag_blake3(hash: &blake3::Hash) -> ContentHash {
    ContentHash::from_blake3(hash)
}

/// Merkle leaf hash for a shard file (§4.7):
/// `leaf = BLAKE3(path_bytes || 0x00 || file_bytes)`.
#[must_use]
pub fn merkle_leaf(path_bytes: &[u8], file_bytes: &[u8]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path_bytes);
    hasher.update(&[0x00]);
    hasher.update(file_bytes);
    hasher.finalize()
}

/// Fold an ordered list of leaf hashes into a single Merkle root via a
/// balanced binary tree: `internal = BLAKE3(left || right)`, with an odd
/// trailing leaf at any level duplicated rather than promoted unhashed
/// (§4.7). `leaves` must already be in the file set's canonical order
/// (lexicographic path order); this function never reorders its input.
///
/// Returns `None` only when `leaves` is empty — an empty shard file set
/// has no root.
#[must_use]
pub fn merkle_root(leaves: &[blake3::Hash]) -> Option<blake3::Hash> {
    if leaves.is_empty() {
        return None;
    }
    let mut level: Vec<blake3::Hash> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            let left = level[i];
            let right = if i + 1 < level.len() {
                level[i + 1]
            } else {
                left
            };
            let mut hasher = blake3::Hasher::new();
            hasher.update(left.as_bytes());
            hasher.update(right.as_bytes());
            next.push(hasher.finalize());
            i += 2;
        }
        level = next;
    }
    Some(level[0])
}
