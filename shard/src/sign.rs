//! Detached Ed25519 signing and verification of `manifest.json` (§4.7,
//! §4.8), wrapping `ed25519-dalek` v2 the way the pack's `contracts-signer`
//! binary wraps it: sign the canonical bytes, write the raw signature.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Error signing or verifying with Ed25519.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// A key or signature byte string had the wrong length or encoding.
    MalformedKey { detail: String },
    /// Signature verification failed against the given public key.
    VerificationFailed,
}

impl std::fmt::Display for SignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedKey { detail } => write!(f, "malformed key material: {detail}"),
            Self::VerificationFailed => write!(f, "signature verification failed"),
        }
    }
}

impl std::error::Error for SignError {}

/// Parse a 32-byte Ed25519 signing (secret) key from raw bytes.
///
/// # Errors
///
/// Returns [`SignError::MalformedKey`] if `bytes` is not exactly 32 bytes.
pub fn signing_key_from_bytes(bytes: &[u8]) -> Result<SigningKey, SignError> {
    let arr: [u8; 32] = bytes.try_into().map_err(|_| SignError::MalformedKey {
        detail: format!("expected 32-byte signing key, got {} bytes", bytes.len()),
    })?;
    Ok(SigningKey::from_bytes(&arr))
}

/// Parse a 32-byte Ed25519 verifying (public) key from raw bytes.
///
/// # Errors
///
/// Returns [`SignError::MalformedKey`] if `bytes` is not exactly 32 bytes
/// or does not decode to a valid point.
pub fn verifying_key_from_bytes(bytes: &[u8]) -> Result<VerifyingKey, SignError> {
    let arr: [u8; 32] = bytes.try_into().map_err(|_| SignError::MalformedKey {
        detail: format!("expected 32-byte public key, got {} bytes", bytes.len()),
    })?;
    VerifyingKey::from_bytes(&arr).map_err(|e| SignError::MalformedKey {
        detail: e.to_string(),
    })
}

/// Sign `message` (the canonical `manifest.json` bytes), returning the
/// raw 64-byte signature.
#[must_use]
pub fn sign(key: &SigningKey, message: &[u8]) -> [u8; 64] {
    let sig: Signature = key.sign(message);
    sig.to_bytes()
}

/// Verify a detached signature over `message`.
///
/// # Errors
///
/// Returns [`SignError::MalformedKey`] if `signature_bytes` is not 64
/// bytes, or [`SignError::VerificationFailed`] if the signature doesn't
/// validate against `key`.
pub fn verify(key: &VerifyingKey, message: &[u8], signature_bytes: &[u8]) -> Result<(), SignError> {
    let arr: [u8; 64] = signature_bytes.try_into().map_err(|_| SignError::MalformedKey {
        detail: format!("expected 64-byte signature, got {} bytes", signature_bytes.len()),
    })?;
    let signature = Signature::from_bytes(&arr);
    key.verify(message, &signature)
        .map_err(|_| SignError::VerificationFailed)
}
