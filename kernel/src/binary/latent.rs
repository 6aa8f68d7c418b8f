//! Latent stream scanner (§4.4): strict, fixed-width, strictly monotonic
//! `frame_id`. A mismatched magic, length, or CRC outside the very first
//! record triggers resync rather than an immediate fatal error.

use std::collections::VecDeque;
use std::io::{Read, Seek};

use crate::binary::config::RecordScanConfig;
use crate::binary::records::{LatentRow, LATENT_MAGIC};
use crate::binary::resync::{resync, FrameCursor};
use crate::binary::status::RecordStatus;
use crate::binary::BinaryScanError;
use crate::hash::blake3_raw;

/// Scan `reader` as a `cam_latents.bin` stream under `config`.
pub fn scan<R: Read + Seek>(
    reader: R,
    config: RecordScanConfig,
) -> impl Iterator<Item = Result<LatentRow, BinaryScanError>> {
    LatentScanner {
        cursor: FrameCursor::new(reader),
        config,
        expected_frame_id: None,
        finished: false,
        pending: VecDeque::new(),
    }
}

struct LatentScanner<R> {
    cursor: FrameCursor<R>,
    config: RecordScanConfig,
    expected_frame_id: Option<u64>,
    finished: bool,
    /// Synthesized `missing` rows queued ahead of the next real record
    /// (§4.4: a gap that resync produced is not an error, it is recorded
    /// as `status=missing` rows for the frame_ids that never surfaced).
    pending: VecDeque<LatentRow>,
}

impl<R: Read + Seek> LatentScanner<R> {
    /// Resync from `record_start`, queueing any synthesized `missing` rows
    /// together with the recovered record in `self.pending`, in ascending
    /// frame_id order, so callers never observe the resynced row before the
    /// gap it closed.
    fn handle_invalid(&mut self, record_start: u64) -> Result<(), BinaryScanError> {
        let search_start = record_start + 1;
        let config = self.config;
        let outcome = resync(
            &mut self.cursor,
            search_start,
            LATENT_MAGIC,
            config.latent_payload_len,
            config.resync_window,
            move |h, p| {
                h.magic == LATENT_MAGIC
                    && h.len == config.latent_payload_len
                    && crc32fast::hash(p) == h.crc
            },
        )
        .map_err(|e| {
            self.finished = true;
            BinaryScanError::Truncated {
                offset: record_start,
                detail: e.to_string(),
            }
        })?;

        let Some(skipped) = outcome else {
            self.finished = true;
            return Err(BinaryScanError::ResyncLimit {
                started_at: record_start,
                window: self.config.resync_window,
            });
        };

        let offset = search_start + skipped;
        let header = self
            .cursor
            .read_header()
            .map_err(|e| BinaryScanError::Truncated {
                offset,
                detail: e.to_string(),
            })?
            .expect("resync already confirmed a readable header at this offset");
        let payload = self
            .cursor
            .read_payload(header.len)
            .map_err(|e| BinaryScanError::Truncated {
                offset,
                detail: e.to_string(),
            })?;

        // The recovered record's frame_id may be strictly ahead of what was
        // expected before the corruption: every frame_id in that gap never
        // surfaced a valid record and is synthesized as `missing` so the
        // stream table accounts for every frame_id in the contiguous range,
        // not just the ones that happened to parse (§4.4, §3 data model).
        if let Some(expected) = self.expected_frame_id {
            for missing_frame_id in expected..header.frame_id {
                self.pending.push_back(LatentRow {
                    frame_id: missing_frame_id,
                    offset,
                    length: 0,
                    status: RecordStatus::Missing,
                    content_hash: blake3_raw(&[]),
                    timestamp_ns: 0,
                });
            }
        }

        self.expected_frame_id = Some(header.frame_id + 1);
        self.pending.push_back(LatentRow {
            frame_id: header.frame_id,
            offset,
            length: header.len,
            status: RecordStatus::Resynced { skipped },
            content_hash: blake3_raw(&payload),
            timestamp_ns: header.timestamp_ns,
        });
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for LatentScanner<R> {
    type Item = Result<LatentRow, BinaryScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.pending.pop_front() {
            return Some(Ok(row));
        }
        if self.finished {
            return None;
        }

        let record_start = self.cursor.offset();
        let header = match self.cursor.read_header() {
            Ok(Some(h)) => h,
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(e) => {
                self.finished = true;
                return Some(Err(BinaryScanError::Truncated {
                    offset: record_start,
                    detail: e.to_string(),
                }));
            }
        };

        if header.magic != LATENT_MAGIC && record_start == 0 {
            self.finished = true;
            return Some(Err(BinaryScanError::BadMagic {
                offset: record_start,
                found: header.magic,
            }));
        }
        if header.magic != LATENT_MAGIC || header.len != self.config.latent_payload_len {
            if let Err(e) = self.handle_invalid(record_start) {
                return Some(Err(e));
            }
            return self.pending.pop_front().map(Ok);
        }

        let payload = match self.cursor.read_payload(header.len) {
            Ok(p) => p,
            Err(e) => {
                self.finished = true;
                return Some(Err(BinaryScanError::Truncated {
                    offset: record_start,
                    detail: e.to_string(),
                }));
            }
        };

        if crc32fast::hash(&payload) != header.crc {
            // Unlike a bad magic or a mismatched length, a correct magic and
            // length with a failing CRC is a confirmed record whose payload
            // was corrupted in place — not a framing loss to recover from.
            // The strict latent stream treats this as fatal rather than
            // resyncing past it.
            self.finished = true;
            return Some(Err(BinaryScanError::CrcMismatch {
                offset: record_start,
                frame_id: header.frame_id,
            }));
        }

        if let Some(expected) = self.expected_frame_id {
            if header.frame_id != expected {
                self.finished = true;
                return Some(Err(BinaryScanError::OutOfOrder {
                    offset: record_start,
                    expected,
                    found: header.frame_id,
                }));
            }
        }
        self.expected_frame_id = Some(header.frame_id + 1);

        Some(Ok(LatentRow {
            frame_id: header.frame_id,
            offset: record_start,
            length: header.len,
            status: RecordStatus::Ok,
            content_hash: blake3_raw(&payload),
            timestamp_ns: header.timestamp_ns,
        }))
    }
}
