//! Capsule loader (C2, §4.2): opens a capsule directory, validates
//! `meta.json`, and exposes `events.jsonl` as an immutable byte slice plus
//! its stable `source_hash`. Binary streams are opened lazily as buffered
//! file handles — never read whole into memory (§5 Resource bounds).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::capsule::meta::CapsuleMeta;
use crate::hash::{sha256_content_hash, ContentHash};

const META_FILENAME: &str = "meta.json";
const EVENTS_FILENAME: &str = "events.jsonl";
const LATENTS_FILENAME: &str = "cam_latents.bin";
const RESIDUALS_FILENAME: &str = "cam_residuals.bin";

/// Error opening a capsule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapsuleLoadError {
    /// `meta.json` is absent.
    MissingMeta,
    /// `events.jsonl` is absent.
    MissingEvents,
    /// `meta.json` declares an encoding/newline this compiler doesn't
    /// support.
    UnsupportedEncoding { found_encoding: String, found_newline: String },
    /// I/O failure opening or reading a capsule file.
    Io { detail: String },
    /// `meta.json` failed to parse.
    MetaParseError { detail: String },
}

impl std::fmt::Display for CapsuleLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMeta => write!(f, "missing meta.json"),
            Self::MissingEvents => write!(f, "missing events.jsonl"),
            Self::UnsupportedEncoding {
                found_encoding,
                found_newline,
            } => write!(
                f,
                "unsupported capsule encoding={found_encoding:?} newline={found_newline:?}"
            ),
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MetaParseError { detail } => write!(f, "meta.json parse error: {detail}"),
        }
    }
}

impl std::error::Error for CapsuleLoadError {}

/// An open capsule: validated metadata, the full `events.jsonl` bytes
/// (the event scanner always works against this in-memory slice, since
/// offsets are reported on the raw byte stream as-is), and lazy paths to
/// the two binary side-channels.
pub struct Capsule {
    root: PathBuf,
    meta: CapsuleMeta,
    events_bytes: Vec<u8>,
    source_hash: ContentHash,
}

impl Capsule {
    /// Open a capsule directory.
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleLoadError`] if `meta.json`/`events.jsonl` are
    /// missing, `meta.json` fails to parse, or the declared encoding is
    /// unsupported.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CapsuleLoadError> {
        let root = dir.as_ref().to_path_buf();

        let meta_path = root.join(META_FILENAME);
        if !meta_path.is_file() {
            return Err(CapsuleLoadError::MissingMeta);
        }
        let meta_bytes = std::fs::read(&meta_path).map_err(|e| CapsuleLoadError::Io {
            detail: format!("reading {}: {e}", meta_path.display()),
        })?;
        let meta = CapsuleMeta::parse(&meta_bytes)
            .map_err(|detail| CapsuleLoadError::MetaParseError { detail })?;
        if !meta.is_supported_encoding() {
            return Err(CapsuleLoadError::UnsupportedEncoding {
                found_encoding: meta.event_log_encoding.clone(),
                found_newline: meta.event_log_newline.clone(),
            });
        }

        let events_path = root.join(EVENTS_FILENAME);
        if !events_path.is_file() {
            return Err(CapsuleLoadError::MissingEvents);
        }
        let events_bytes = std::fs::read(&events_path).map_err(|e| CapsuleLoadError::Io {
            detail: format!("reading {}: {e}", events_path.display()),
        })?;
        let source_hash = sha256_content_hash(&events_bytes);

        Ok(Self {
            root,
            meta,
            events_bytes,
            source_hash,
        })
    }

    #[must_use]
    pub fn meta(&self) -> &CapsuleMeta {
        &self.meta
    }

    /// The raw, as-is bytes of `events.jsonl`.
    #[must_use]
    pub fn events_bytes(&self) -> &[u8] {
        &self.events_bytes
    }

    /// `SHA-256(events.jsonl)`, stable for the lifetime of the capsule.
    #[must_use]
    pub fn source_hash(&self) -> &ContentHash {
        &self.source_hash
    }

    /// Open `cam_latents.bin` for buffered, bounded reading. Returns
    /// `Ok(None)` if the file is absent (a capsule may have no latent
    /// stream at all, though every deployed robot in practice does).
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleLoadError::Io`] on an I/O failure other than the
    /// file being absent.
    pub fn open_latents(&self) -> Result<Option<BufReader<File>>, CapsuleLoadError> {
        self.open_binary_stream(LATENTS_FILENAME)
    }

    /// Open `cam_residuals.bin` for buffered, bounded reading. Returns
    /// `Ok(None)` if the file is absent (the normal, expected state for a
    /// safe run with no Tier-1 events, §4.5 Safe-run invariant).
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleLoadError::Io`] on an I/O failure other than the
    /// file being absent.
    pub fn open_residuals(&self) -> Result<Option<BufReader<File>>, CapsuleLoadError> {
        self.open_binary_stream(RESIDUALS_FILENAME)
    }

    /// True if `cam_residuals.bin` is absent or zero-length.
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleLoadError::Io`] if the file exists but its
    /// metadata cannot be read.
    pub fn residuals_is_absent_or_empty(&self) -> Result<bool, CapsuleLoadError> {
        Ok(self.residuals_len()? == 0)
    }

    /// Byte length of `cam_residuals.bin`, or `0` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleLoadError::Io`] if the file exists but its
    /// metadata cannot be read.
    pub fn residuals_len(&self) -> Result<u64, CapsuleLoadError> {
        let path = self.root.join(RESIDUALS_FILENAME);
        if !path.is_file() {
            return Ok(0);
        }
        let len = std::fs::metadata(&path)
            .map_err(|e| CapsuleLoadError::Io {
                detail: format!("stat {}: {e}", path.display()),
            })?
            .len();
        Ok(len)
    }

    fn open_binary_stream(
        &self,
        filename: &str,
    ) -> Result<Option<BufReader<File>>, CapsuleLoadError> {
        let path = self.root.join(filename);
        if !path.is_file() {
            return Ok(None);
        }
        let file = File::open(&path).map_err(|e| CapsuleLoadError::Io {
            detail: format!("opening {}: {e}", path.display()),
        })?;
        Ok(Some(BufReader::new(file)))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
