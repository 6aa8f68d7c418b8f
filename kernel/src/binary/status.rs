//! Per-record recovery status (§4.4, §8 invariant 8).

/// The recovery state a scanned record was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Header validated, CRC matched, frame_id in sequence.
    Ok,
    /// Emitted after the scanner recovered from a corrupted record by
    /// skipping forward to the next valid magic/CRC.
    Resynced { skipped: u64 },
    /// A frame_id the judge expected (to preserve latent monotonicity)
    /// but that the scanner could not locate on disk, synthesized as a
    /// placeholder row rather than silently omitted.
    Missing,
}
