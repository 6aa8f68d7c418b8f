//! Wire format and row types shared by the latent and residual scanners
//! (§4.4, §6): both streams share one 28-byte header shape, differing
//! only in their magic bytes and in whether `len` is fixed or bounded.
//!
//! ```text
//! Header := magic[4] | len:u32 | frame_id:u64 | timestamp_ns:u64 | crc:u32
//! Record := Header | payload[len]
//! ```
//!
//! All integers are little-endian. CRC-32 (IEEE 802.3) is computed over
//! `payload` only, never the header.

use crate::binary::status::RecordStatus;

pub const LATENT_MAGIC: [u8; 4] = *b"L1\0\0";
pub const RESIDUAL_MAGIC: [u8; 4] = *b"R1\0\0";
pub const HEADER_LEN: usize = 4 + 4 + 8 + 8 + 4;

/// A parsed, not-yet-payload-validated record header.
#[derive(Debug, Clone, Copy)]
pub struct RawHeader {
    pub magic: [u8; 4],
    pub len: u32,
    pub frame_id: u64,
    pub timestamp_ns: u64,
    pub crc: u32,
}

impl RawHeader {
    /// Parse a header from exactly [`HEADER_LEN`] bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != HEADER_LEN`; callers always read exactly
    /// that many bytes before calling this.
    #[must_use]
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let frame_id = u64::from_le_bytes(bytes[8..16].try_into().unwrap());
        let timestamp_ns = u64::from_le_bytes(bytes[16..24].try_into().unwrap());
        let crc = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
        Self {
            magic,
            len,
            frame_id,
            timestamp_ns,
            crc,
        }
    }
}

/// A scanned row from `cam_latents.bin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatentRow {
    pub frame_id: u64,
    pub offset: u64,
    pub length: u32,
    pub status: RecordStatus,
    pub content_hash: blake3::Hash,
    pub timestamp_ns: u64,
}

/// A scanned row from `cam_residuals.bin`. Identical shape to
/// [`LatentRow`] — the residual payload length is already carried via
/// `length`, so no extra field is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidualRow {
    pub frame_id: u64,
    pub offset: u64,
    pub length: u32,
    pub status: RecordStatus,
    pub content_hash: blake3::Hash,
    pub timestamp_ns: u64,
}
