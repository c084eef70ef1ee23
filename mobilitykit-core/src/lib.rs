#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Core functionality of the MobilityKit enterprise-mobility SDK.
//!
//! The host application supplies the platform collaborators — authorization
//! handshake, provider registry, inter-app transport, attachment store — as
//! foreign trait implementations; this crate owns the secure-session
//! bootstrap, capability resolution, request dispatch, and the workflow step
//! registry.

mod catalog;
pub use catalog::*;

pub mod defaults;

mod email;
pub use email::*;

mod environment;
pub use environment::*;

mod error;
pub use error::*;

mod events;
pub use events::*;

mod invoker;
pub use invoker::*;

pub mod logger;

mod steps;
pub use steps::*;

mod storage;
pub use storage::*;

mod transfer;
pub use transfer::*;

uniffi::setup_scaffolding!("mobilitykit_core");
