//! Error taxonomy for the secure-session and capability-invocation surfaces.

use thiserror::Error;

use crate::events::ResultCode;

/// Terminal outcomes of the authorization handshake, surfaced to
/// [`crate::SecureEnvironment::become_ready`] callers.
///
/// Benign sub-codes (idle lockout) and duplicate "already authorized" signals
/// never surface here; they are suppressed by design.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum AuthorizationError {
    /// The platform security subsystem denied or failed the handshake with a
    /// non-benign status code. Not retried internally; retry policy belongs
    /// to the caller.
    #[error("authorization refused: {code}")]
    Refused {
        /// The status code carried by the terminal lifecycle event.
        code: ResultCode,
    },
    /// The secure environment was torn down while the handshake was still in
    /// flight, so the outcome can no longer be delivered.
    #[error("secure environment dropped before the handshake resolved")]
    HandshakeAbandoned,
}

/// Failure reported by the platform inter-app transport.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
pub enum TransportError {
    /// The transport rejected or could not complete the send.
    #[error("{reason}")]
    Send {
        /// The transport's own description of the failure.
        reason: String,
    },
}

/// Failures of capability resolution and dispatch.
///
/// `DesiredTargetNotFound` is deliberately distinct from `NoProvider` so a
/// host UI can offer a targeted remediation (install one specific app) rather
/// than a generic error.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum CapabilityError {
    /// No installed peer application is registered for the capability.
    /// Absence of a provider is a normal outcome of resolution, reported as
    /// an error only because the request cannot proceed without one.
    #[error("no provider registered for capability: {capability}")]
    NoProvider {
        /// The capability that has no provider.
        capability: String,
    },
    /// A specifically preferred peer was requested but is not installed, or
    /// is installed without a usable address.
    #[error("preferred provider not found: {target}")]
    DesiredTargetNotFound {
        /// The peer identifier that could not be resolved.
        target: String,
    },
    /// The transport rejected the dispatch; the cause is passed through
    /// unchanged.
    #[error("dispatch failed: {0}")]
    DispatchFailed(#[from] TransportError),
}
