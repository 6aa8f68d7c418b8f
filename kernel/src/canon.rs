//! Text canonicalization and canonical ID minting.
//!
//! Ported in spirit from the teacher's `Code32`/hashing primitives: a
//! single, observable, order-fixed transform feeding a single hashing
//! entry point. Canonicalization order is fixed and public (§4.1):
//!
//! 1. Unicode NFKC.
//! 2. Unicode full case-folding.
//! 3. Collapse runs of whitespace to a single U+0020; trim ends.
//! 4. Strip C0/C1 control characters.
//!
//! `mint` hands the canonical bytes to SHA-256, takes the leading 15
//! bytes of the digest, and encodes them as unpadded, uppercase
//! Crockford base32 — hand-rolled rather than pulled from a crate, the
//! same call the pack's `workingdoge-premath` witness module makes for
//! its own base32hex id minting.

use caseless::Caseless;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Error canonicalizing or minting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    /// Input bytes are not valid UTF-8.
    InvalidInput { detail: String },
}

impl std::fmt::Display for CanonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { detail } => write!(f, "invalid input: {detail}"),
        }
    }
}

impl std::error::Error for CanonError {}

/// Crockford base32 alphabet (uppercase, no padding, excludes I/L/O/U).
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of leading digest bytes fed to the base32 encoder.
const ID_DIGEST_PREFIX_LEN: usize = 15;

/// Canonicalize `text` to its normalized byte form (§4.1, steps 1-4).
///
/// # Errors
///
/// Returns [`CanonError::InvalidInput`] if `text` is not valid UTF-8.
pub fn canonicalize(text: &[u8]) -> Result<Vec<u8>, CanonError> {
    let s = std::str::from_utf8(text).map_err(|e| CanonError::InvalidInput {
        detail: e.to_string(),
    })?;

    // 1. NFKC, 2. full case-fold.
    let nfkc: String = s.nfkc().collect();
    let folded: String = nfkc.chars().default_case_fold().collect();

    // 3. Collapse whitespace runs to a single U+0020; trim ends.
    // 4. Strip C0/C1 control characters (the LF line-delimiter is already
    //    stripped upstream at line-scan boundaries and never reaches here).
    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    let mut seen_non_space = false;
    for ch in folded.chars() {
        if is_control(ch) {
            continue;
        }
        if ch.is_whitespace() {
            if seen_non_space {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
        seen_non_space = true;
    }

    Ok(out.into_bytes())
}

/// True for C0 (U+0000-U+001F, U+007F) and C1 (U+0080-U+009F) controls.
fn is_control(ch: char) -> bool {
    let c = ch as u32;
    (c <= 0x1F) || c == 0x7F || (0x80..=0x9F).contains(&c)
}

/// Mint a prefixed canonical ID from a text payload (§4.1).
///
/// `prefix` is one of `"e_"`, `"c_"`, `"s_"`, `"p_"` (entity, claim, span,
/// provenance) per the umbrella ID scheme; any caller-chosen prefix is
/// accepted so the function composes cleanly with future row kinds.
///
/// # Errors
///
/// Returns [`CanonError::InvalidInput`] if `payload` is not valid UTF-8.
pub fn mint(prefix: &str, payload: &[u8]) -> Result<String, CanonError> {
    let canonical = canonicalize(payload)?;
    let digest = Sha256::digest(&canonical);
    let prefix_bytes = &digest[..ID_DIGEST_PREFIX_LEN];
    let encoded = base32_crockford_no_pad(prefix_bytes);
    Ok(format!("{prefix}_{encoded}"))
}

/// Mint an ID directly from an already-canonical UTF-8 payload, skipping
/// the canonicalization pass. Used for payloads that are synthesized
/// in-process (e.g. `"<source_hash>|<byte_start>|<byte_end>"` span keys)
/// and are already free of the whitespace/casing variance canonicalization
/// exists to absorb.
#[must_use]
pub fn mint_raw(prefix: &str, payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    let prefix_bytes = &digest[..ID_DIGEST_PREFIX_LEN];
    let encoded = base32_crockford_no_pad(prefix_bytes);
    format!("{prefix}_{encoded}")
}

/// Encode bytes as unpadded, uppercase Crockford base32.
fn base32_crockford_no_pad(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            let idx = ((buffer >> bits) & 0x1F) as usize;
            out.push(CROCKFORD_ALPHABET[idx] as char);
        }
    }
    if bits > 0 {
        let idx = ((buffer << (5 - bits)) & 0x1F) as usize;
        out.push(CROCKFORD_ALPHABET[idx] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_collapses_whitespace_and_trims() {
        let out = canonicalize(b"  hello   world  \t\n".trim_end().as_bytes()).unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn canonicalize_case_folds() {
        let out = canonicalize("HELLO".as_bytes()).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn canonicalize_strips_control_chars() {
        let out = canonicalize(b"a\x01b\x7fc").unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn canonicalize_rejects_invalid_utf8() {
        let err = canonicalize(&[0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, CanonError::InvalidInput { .. }));
    }

    #[test]
    fn mint_is_deterministic() {
        let a = mint("e_", b"frame").unwrap();
        let b = mint("e_", b"frame").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mint_prefixes_output() {
        let id = mint("c_", b"claim-payload").unwrap();
        assert!(id.starts_with("c_"));
    }

    #[test]
    fn mint_is_sensitive_to_canonical_equivalence() {
        // Differ only by case/whitespace: must mint to the same ID.
        let a = mint("e_", "  Frame  One ".as_bytes()).unwrap();
        let b = mint("e_", "frame one".as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mint_differs_for_different_payloads() {
        let a = mint("e_", b"alpha").unwrap();
        let b = mint("e_", b"beta").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn crockford_alphabet_excludes_ambiguous_letters() {
        let s = String::from_utf8(CROCKFORD_ALPHABET.to_vec()).unwrap();
        for bad in ['I', 'L', 'O', 'U'] {
            assert!(!s.contains(bad));
        }
    }

    #[test]
    fn mint_raw_matches_mint_for_already_canonical_input() {
        let payload = b"alreadylowercasewithnospaces";
        assert_eq!(mint("s_", payload).unwrap(), mint_raw("s_", payload));
    }
}
