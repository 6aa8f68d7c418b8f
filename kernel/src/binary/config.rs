//! Scan configuration (§4.4). No defaults are baked into the scanner —
//! every field is caller-supplied, the same `PolicyConfig`-style contract
//! the teacher uses for its own frame budgets.

/// Bounds and fixed sizes that govern a binary record scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordScanConfig {
    /// Fixed payload size, in bytes, of every latent record.
    pub latent_payload_len: u32,
    /// Hard cap on a residual record's declared payload length. A larger
    /// declared length signals corruption, not a legitimately large record.
    pub residual_max_len: u32,
    /// Maximum number of bytes the scanner may skip while resyncing
    /// before giving up and reporting the remaining frames `missing`.
    pub resync_window: u64,
}
