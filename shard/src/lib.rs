//! `flashfreeze-shard`: shard emission (C7) and verification (C8).
//!
//! Owns everything that touches the shard's on-disk tree — columnar
//! table encoding, the Merkle fold, Ed25519 signing, and the trust-store
//! types the verifier consumes — plus the top-level `compile`/`verify`
//! orchestration wiring `flashfreeze-kernel` and `flashfreeze-judge`
//! together into one pipeline run.

pub mod clock;
pub mod columnar;
pub mod compile;
pub mod manifest;
pub mod merkle;
pub mod sign;
pub mod trust;
pub mod verifier;
pub mod writer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use compile::{compile as compile_capsule, CompileConfig, CompileError};
pub use manifest::{Manifest, ManifestError};
pub use trust::{LocalPolicyV1, TrustStoreV1};
pub use verifier::{verify_shard, CapsuleCheck, VerifyError, VerifyReport};
pub use writer::{write_shard, ShardSource, WriteError};
