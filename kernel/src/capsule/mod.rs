//! Capsule access: the read-only input directory to the compiler (§3, §4.2).

pub mod events;
pub mod loader;
pub mod meta;

pub use events::{Event, EventKind, EventScanError, EventScanner, ScannedEvent};
pub use loader::{Capsule, CapsuleLoadError};
pub use meta::CapsuleMeta;
