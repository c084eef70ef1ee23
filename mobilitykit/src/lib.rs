#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! MobilityKit — the crate host applications link against.
//!
//! Re-exports the whole core API; binding generation for foreign hosts picks
//! up the core's scaffolding through this library.

pub use mobilitykit_core::*;

/// Convenience result alias over the capability error taxonomy.
pub type MobilityKitResult<T, E = CapabilityError> = std::result::Result<T, E>;
