//! Canonical JSON bytes: the single serialization-for-hashing implementation.
//!
//! All manifest, governance, and row-set JSON that participates in a hash
//! or signature surface is produced exclusively through this module.
//!
//! # Canonicalization rules
//!
//! 1. Object keys are sorted lexicographically (byte order).
//! 2. No extraneous whitespace (compact form: `{"a":1,"b":2}`).
//! 3. Strings are JSON-escaped per RFC 8259 §7.
//! 4. Numbers must be integers (`i64` or `u64`); floats, NaN, and Infinity
//!    are rejected to prevent cross-platform formatting drift.
//! 5. `null`, `true`, `false` are written literally.
//! 6. Output is always valid UTF-8, terminated with a single trailing LF.

use std::io::Write;

/// Error serializing a value to canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonJsonError {
    /// A JSON number was not an integer (float, NaN, Infinity).
    NonIntegerNumber { raw: String },
}

impl std::fmt::Display for CanonJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonIntegerNumber { raw } => {
                write!(f, "non-integer number in canonical JSON: {raw}")
            }
        }
    }
}

impl std::error::Error for CanonJsonError {}

/// Produce canonical JSON bytes from a `serde_json::Value`, with no
/// trailing newline (the compact value form itself).
///
/// # Errors
///
/// Returns [`CanonJsonError::NonIntegerNumber`] if any JSON number is not
/// representable as `i64` or `u64`.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonJsonError> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

/// Same as [`canonical_json_bytes`] but appends a single trailing LF, the
/// form `manifest.json` and the governance files are written in on disk
/// (§4.7: "UTF-8, LF line endings, sorted keys, no trailing whitespace").
///
/// # Errors
///
/// Returns [`CanonJsonError::NonIntegerNumber`] if any JSON number is not
/// representable as `i64` or `u64`.
pub fn canonical_json_file_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonJsonError> {
    let mut buf = canonical_json_bytes(value)?;
    buf.push(b'\n');
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &serde_json::Value) -> Result<(), CanonJsonError> {
    match value {
        serde_json::Value::Null => buf.extend_from_slice(b"null"),
        serde_json::Value::Bool(b) => {
            buf.extend_from_slice(if *b { b"true" } else { b"false" });
        }
        serde_json::Value::Number(n) => write_number(buf, n)?,
        serde_json::Value::String(s) => write_string(buf, s),
        serde_json::Value::Array(arr) => {
            buf.push(b'[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(buf, item)?;
            }
            buf.push(b']');
        }
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            buf.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_string(buf, key);
                buf.push(b':');
                write_value(buf, &map[*key])?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

fn write_number(buf: &mut Vec<u8>, n: &serde_json::Number) -> Result<(), CanonJsonError> {
    if let Some(i) = n.as_i64() {
        let _ = write!(buf, "{i}");
        Ok(())
    } else if let Some(u) = n.as_u64() {
        let _ = write!(buf, "{u}");
        Ok(())
    } else {
        Err(CanonJsonError::NonIntegerNumber {
            raw: n.to_string(),
        })
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Verify that `raw_bytes` are already in canonical JSON form by
/// re-serializing the parsed value and comparing byte-for-byte. Used by
/// the verifier to reject a non-canonical `manifest.json`.
///
/// # Errors
///
/// Returns a string detail if the bytes do not parse as JSON or are not
/// already canonical.
pub fn verify_canonical(raw_bytes: &[u8]) -> Result<(), String> {
    let value: serde_json::Value =
        serde_json::from_slice(raw_bytes).map_err(|e| format!("JSON parse failed: {e}"))?;
    let canonical =
        canonical_json_file_bytes(&value).map_err(|e| format!("canonicalization failed: {e}"))?;
    if canonical != raw_bytes {
        return Err("bytes are not in canonical JSON form".to_string());
    }
    Ok(())
}
