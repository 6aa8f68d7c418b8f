//! Residual stream scanner (§4.4): permissive in sparsity (frame_ids may
//! skip forward freely) but strict in framing — magic, declared length
//! bound, and CRC must all validate, or the scanner resyncs.

use std::io::{Read, Seek};

use crate::binary::config::RecordScanConfig;
use crate::binary::records::{ResidualRow, RESIDUAL_MAGIC};
use crate::binary::resync::{resync, FrameCursor};
use crate::binary::status::RecordStatus;
use crate::binary::BinaryScanError;
use crate::hash::blake3_raw;

/// Scan `reader` as a `cam_residuals.bin` stream under `config`.
pub fn scan<R: Read + Seek>(
    reader: R,
    config: RecordScanConfig,
) -> impl Iterator<Item = Result<ResidualRow, BinaryScanError>> {
    ResidualScanner {
        cursor: FrameCursor::new(reader),
        config,
        last_frame_id: None,
        finished: false,
    }
}

struct ResidualScanner<R> {
    cursor: FrameCursor<R>,
    config: RecordScanConfig,
    last_frame_id: Option<u64>,
    finished: bool,
}

impl<R: Read + Seek> ResidualScanner<R> {
    fn handle_invalid(&mut self, record_start: u64) -> Result<ResidualRow, BinaryScanError> {
        let search_start = record_start + 1;
        let config = self.config;
        let outcome = resync(
            &mut self.cursor,
            search_start,
            RESIDUAL_MAGIC,
            config.residual_max_len,
            config.resync_window,
            move |h, p| {
                h.magic == RESIDUAL_MAGIC
                    && h.len <= config.residual_max_len
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

        self.last_frame_id = Some(header.frame_id);
        Ok(ResidualRow {
            frame_id: header.frame_id,
            offset,
            length: header.len,
            status: RecordStatus::Resynced { skipped },
            content_hash: blake3_raw(&payload),
            timestamp_ns: header.timestamp_ns,
        })
    }
}

impl<R: Read + Seek> Iterator for ResidualScanner<R> {
    type Item = Result<ResidualRow, BinaryScanError>;

    fn next(&mut self) -> Option<Self::Item> {
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

        if header.magic != RESIDUAL_MAGIC && record_start == 0 {
            self.finished = true;
            return Some(Err(BinaryScanError::BadMagic {
                offset: record_start,
                found: header.magic,
            }));
        }
        if header.magic != RESIDUAL_MAGIC {
            return Some(self.handle_invalid(record_start));
        }
        if header.len > self.config.residual_max_len {
            self.finished = true;
            return Some(Err(BinaryScanError::OversizeRecord {
                offset: record_start,
                declared: header.len,
                max: self.config.residual_max_len,
            }));
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
            return Some(self.handle_invalid(record_start));
        }

        if let Some(last) = self.last_frame_id {
            if header.frame_id < last {
                self.finished = true;
                return Some(Err(BinaryScanError::OutOfOrder {
                    offset: record_start,
                    expected: last,
                    found: header.frame_id,
                }));
            }
        }
        self.last_frame_id = Some(header.frame_id);

        Some(Ok(ResidualRow {
            frame_id: header.frame_id,
            offset: record_start,
            length: header.len,
            status: RecordStatus::Ok,
            content_hash: blake3_raw(&payload),
            timestamp_ns: header.timestamp_ns,
        }))
    }
}
