//! `flashfreeze-judge`: cross-validation of a capsule's event log against
//! its binary record streams (C5), and the evidence graph builder (C6).
//!
//! This crate never touches raw bytes directly — it consumes the
//! `flashfreeze-kernel` types produced by the event scanner and the
//! binary record engine, and produces the row-sets the shard writer
//! persists.

pub mod crossvalidate;
pub mod graph;
pub mod rows;

pub use crossvalidate::{Judge, JudgeError, WindowConfig};
pub use graph::{build_graph, GraphRowSets};
