//! Top-level compile pipeline (§2 data flow: Capsule → (C2,C3,C4) → C5 →
//! C6 → C7 → Shard). `CompileError` aggregates every sub-stage's error
//! type, modeled on the teacher's `RunError` in `harness/src/runner.rs`.

use std::path::Path;

use ed25519_dalek::SigningKey;

use flashfreeze_judge::crossvalidate::{Judge, JudgeError, WindowConfig};
use flashfreeze_judge::graph::build_graph;
use flashfreeze_kernel::binary::{latent, residual, BinaryScanError, RecordScanConfig};
use flashfreeze_kernel::capsule::{Capsule, CapsuleLoadError, EventScanError, EventScanner};

use crate::trust::{LocalPolicyV1, TrustStoreV1};
use crate::writer::{write_shard, ShardSource, WriteError};
use crate::clock::Clock;

/// Every error a compile run can fail with, aggregating the originating
/// sub-module's error (teacher's `RunError` aggregating
/// `WorldHarnessError`/`BundleBuildError`/`PolicyViolation` is the direct
/// model for this enum).
#[derive(Debug)]
pub enum CompileError {
    CapsuleLoad(CapsuleLoadError),
    EventScan(EventScanError),
    BinaryScan(BinaryScanError),
    Judge(JudgeError),
    Write(WriteError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapsuleLoad(e) => write!(f, "capsule load error: {e}"),
            Self::EventScan(e) => write!(f, "event scan error: {e}"),
            Self::BinaryScan(e) => write!(f, "binary scan error: {e}"),
            Self::Judge(e) => write!(f, "cross-validation error: {e}"),
            Self::Write(e) => write!(f, "shard write error: {e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<CapsuleLoadError> for CompileError {
    fn from(e: CapsuleLoadError) -> Self {
        Self::CapsuleLoad(e)
    }
}

impl From<EventScanError> for CompileError {
    fn from(e: EventScanError) -> Self {
        Self::EventScan(e)
    }
}

impl From<BinaryScanError> for CompileError {
    fn from(e: BinaryScanError) -> Self {
        Self::BinaryScan(e)
    }
}

impl From<JudgeError> for CompileError {
    fn from(e: JudgeError) -> Self {
        Self::Judge(e)
    }
}

impl From<WriteError> for CompileError {
    fn from(e: WriteError) -> Self {
        Self::Write(e)
    }
}

/// Everything the caller must supply beyond the capsule/shard paths: the
/// binary-scan bounds, the cross-validation window, the signing key, and
/// the governance snapshot to embed (audit-only; never the verifier's
/// trust authority, see [`crate::trust`]).
pub struct CompileConfig<'a> {
    pub record_scan: RecordScanConfig,
    pub window: WindowConfig,
    pub signing_key: &'a SigningKey,
    pub trust_store: &'a TrustStoreV1,
    pub local_policy: &'a LocalPolicyV1,
    pub clock: &'a dyn Clock,
}

/// Compile a capsule directory into a shard directory.
///
/// Wires C2 (load) → C3 (event scan) → C4 (binary scan, both streams) →
/// C5 (cross-validate) → C6 (graph build) → C7 (write), aborting at the
/// first error from any stage.
///
/// # Errors
///
/// Returns [`CompileError`] on any stage's failure; no partial shard is
/// left behind with a valid `sig/manifest.sig` (the writer only reaches
/// the signing step after every prior step succeeds).
pub fn compile(
    capsule_dir: &Path,
    shard_dir: &Path,
    config: &CompileConfig<'_>,
) -> Result<(), CompileError> {
    let capsule = Capsule::open(capsule_dir)?;

    let events: Vec<_> = EventScanner::new(capsule.events_bytes())
        .collect::<Result<Vec<_>, _>>()?;

    let latent_rows = match capsule.open_latents()? {
        Some(reader) => latent::scan(reader, config.record_scan).collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    let residual_rows = match capsule.open_residuals()? {
        Some(reader) => {
            residual::scan(reader, config.record_scan).collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let scanned_events: Vec<_> = events;
    let stream_rows = Judge::run(&scanned_events, &latent_rows, &residual_rows, config.window)?;

    let graph = build_graph(&scanned_events, &stream_rows, capsule.events_bytes(), capsule.source_hash());

    let source = ShardSource {
        events_bytes: capsule.events_bytes(),
        capsule_hash: capsule.source_hash(),
        graph: &graph,
        stream_rows: &stream_rows,
    };
    write_shard(
        shard_dir,
        &source,
        config.signing_key,
        config.trust_store,
        config.local_policy,
        config.clock,
    )?;

    Ok(())
}
