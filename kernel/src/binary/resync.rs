//! Shared cursor and resync search used by both the latent and residual
//! scanners (§4.4). Resync advances one byte at a time looking for the
//! next valid magic, confirming a candidate only once its full header,
//! payload, and CRC validate — never on magic bytes alone.

use std::io::{self, Read, Seek, SeekFrom};

use crate::binary::records::{RawHeader, HEADER_LEN};

/// A bounded-buffer reader over a binary record stream: never holds more
/// than one header-plus-payload in memory at a time (§5 Resource bounds).
pub struct FrameCursor<R> {
    reader: R,
    offset: u64,
}

impl<R: Read + Seek> FrameCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next header. `Ok(None)` means a clean end-of-stream with
    /// zero bytes consumed (no record starts here); any other failure to
    /// fill the header is a truncation.
    pub fn read_header(&mut self) -> io::Result<Option<RawHeader>> {
        let mut buf = [0u8; HEADER_LEN];
        if self.fill_or_eof(&mut buf)? {
            Ok(Some(RawHeader::parse(&buf)))
        } else {
            Ok(None)
        }
    }

    /// Read a declared payload in full.
    pub fn read_payload(&mut self, len: u32) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len as usize];
        self.reader.read_exact(&mut buf)?;
        self.offset += u64::from(len);
        Ok(buf)
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(pos))?;
        self.offset = pos;
        Ok(())
    }

    /// Fills `buf` completely, returning `Ok(false)` only if zero bytes
    /// were available (clean EOF at a record boundary). Any partial fill
    /// is reported as an `UnexpectedEof` I/O error — a genuine truncation.
    fn fill_or_eof(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        let mut total = 0;
        while total < buf.len() {
            let n = self.reader.read(&mut buf[total..])?;
            if n == 0 {
                if total == 0 {
                    return Ok(false);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "truncated record header",
                ));
            }
            total += n;
        }
        self.offset += buf.len() as u64;
        Ok(true)
    }
}

/// Search forward from `start` for a byte offset whose header carries
/// `magic`, whose declared length is within `max_len`, and whose
/// header-plus-payload passes `validate`. On success, leaves the cursor
/// positioned at the start of the recovered record and returns the
/// number of bytes skipped to reach it. Returns `Ok(None)` if the stream
/// ends, or the window is exceeded, before a valid record is found —
/// distinct conditions the caller folds into the same `ResyncLimit`
/// error, since original §4.4 treats both as scan-ending.
///
/// `max_len` bounds `header.len` *before* `read_payload` allocates a
/// buffer for it (§5 Resource bounds): a spurious magic match followed
/// by an attacker-chosen oversize length is rejected as a candidate
/// without ever sizing a payload buffer for it.
pub fn resync<R: Read + Seek>(
    cursor: &mut FrameCursor<R>,
    start: u64,
    magic: [u8; 4],
    max_len: u32,
    window: u64,
    validate: impl Fn(&RawHeader, &[u8]) -> bool,
) -> io::Result<Option<u64>> {
    let mut probe = start;
    loop {
        let skipped = probe - start;
        if skipped > window {
            return Ok(None);
        }

        cursor.seek_to(probe)?;
        let header = match cursor.read_header()? {
            Some(h) => h,
            None => return Ok(None),
        };

        if header.magic == magic && header.len <= max_len {
            // `read_header` left the cursor immediately after the header;
            // the payload follows contiguously, no seek needed.
            if let Ok(payload_bytes) = cursor.read_payload(header.len) {
                if validate(&header, &payload_bytes) {
                    cursor.seek_to(probe)?;
                    return Ok(Some(skipped));
                }
            }
        }

        probe += 1;
    }
}
