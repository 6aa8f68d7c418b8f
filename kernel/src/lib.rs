//! `flashfreeze-kernel`: canonicalization, capsule access, and the binary
//! record engine for the Flash-Freeze evidence pipeline.
//!
//! This crate owns the parts of the pipeline that touch raw bytes directly:
//! Unicode canonicalization and ID minting (`canon`), canonical JSON
//! serialization and content hashing (`json`, `hash`), capsule loading and
//! event-log scanning (`capsule`), and the framed-scan/resync binary record
//! engine (`binary`). Cross-validation, the graph builder, shard emission,
//! and verification live in the `flashfreeze-judge` and `flashfreeze-shard`
//! crates, which depend on this one.

pub mod binary;
pub mod canon;
pub mod capsule;
pub mod hash;
pub mod json;
