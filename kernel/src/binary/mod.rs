//! Binary record engine (C4, §4.4): frame-scans `cam_latents.bin` (fixed
//! width) and `cam_residuals.bin` (variable width), validating headers and
//! resyncing past corruption.

pub mod config;
pub mod latent;
pub mod records;
pub mod residual;
mod resync;
pub mod status;

pub use config::RecordScanConfig;
pub use records::{LatentRow, ResidualRow};
pub use status::RecordStatus;

/// Error terminating a binary record scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryScanError {
    /// Fewer bytes remained than a full header or declared payload needed.
    Truncated { offset: u64, detail: String },
    /// The four magic bytes at `offset` matched neither stream's magic.
    BadMagic { offset: u64, found: [u8; 4] },
    /// The payload's CRC-32 did not match the header's declared value.
    CrcMismatch { offset: u64, frame_id: u64 },
    /// A record's `frame_id` was lower than a prior valid record's,
    /// outside of a resync recovery.
    OutOfOrder { offset: u64, expected: u64, found: u64 },
    /// A declared payload length exceeded the configured bound.
    OversizeRecord { offset: u64, declared: u32, max: u32 },
    /// Resync search exceeded `resync_window` bytes without finding a
    /// recoverable record.
    ResyncLimit { started_at: u64, window: u64 },
}

impl std::fmt::Display for BinaryScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { offset, detail } => {
                write!(f, "truncated record at offset {offset}: {detail}")
            }
            Self::BadMagic { offset, found } => {
                write!(f, "bad magic at offset {offset}: {found:?}")
            }
            Self::CrcMismatch { offset, frame_id } => {
                write!(f, "CRC mismatch at offset {offset} (frame_id {frame_id})")
            }
            Self::OutOfOrder {
                offset,
                expected,
                found,
            } => write!(
                f,
                "out-of-order frame_id at offset {offset}: expected >= {expected}, found {found}"
            ),
            Self::OversizeRecord {
                offset,
                declared,
                max,
            } => write!(
                f,
                "oversize record at offset {offset}: declared {declared} bytes, max {max}"
            ),
            Self::ResyncLimit { started_at, window } => write!(
                f,
                "resync search from offset {started_at} exceeded window of {window} bytes"
            ),
        }
    }
}

impl std::error::Error for BinaryScanError {}
