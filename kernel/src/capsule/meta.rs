//! `meta.json`: capsule session metadata (§3).

use serde::{Deserialize, Serialize};

/// Required shape of `meta.json`.
///
/// Unknown keys are preserved in `extra` but never interpreted — the
/// narrative payload may evolve independently of the fields this crate
/// depends on (the same forward-compatibility stance the teacher takes
/// with `ByteTraceEnvelopeV1`, a permissive, non-hashed metadata section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapsuleMeta {
    pub robot_id: String,
    pub session_id: String,
    pub started_at: String,
    pub ended_at: String,
    #[serde(rename = "event_log_encoding")]
    pub event_log_encoding: String,
    #[serde(rename = "event_log_newline")]
    pub event_log_newline: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CapsuleMeta {
    /// Parse `meta.json` bytes.
    ///
    /// # Errors
    ///
    /// Returns a string detail on JSON parse failure or a missing
    /// required field.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(bytes).map_err(|e| format!("meta.json parse error: {e}"))
    }

    /// True if the capsule declares the encoding/newline convention this
    /// compiler requires (`utf-8` / `"\n"`).
    #[must_use]
    pub fn is_supported_encoding(&self) -> bool {
        self.event_log_encoding == "utf-8" && self.event_log_newline == "\n"
    }
}
