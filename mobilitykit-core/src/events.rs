//! Lifecycle events of the platform security subsystem and the pure
//! transition logic that consumes them.
//!
//! The platform delegate receives an event-type/status-code pair from the
//! closed-source SDK. Here that pair is a single closed tagged union,
//! [`AppEvent`], consumed by [`classify`] — a pure function, so the whole
//! transition table is unit-testable without the real SDK.

use strum::{Display, EnumString};

/// Status code carried by a security-subsystem lifecycle event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, uniffi::Enum,
)]
#[strum(serialize_all = "snake_case")]
pub enum ResultCode {
    /// No error; the operation succeeded.
    None,
    /// The user's inactivity lock engaged. Transient and informational.
    IdleLockout,
    /// Activation of the secure container failed.
    ActivationFailed,
    /// Provisioning against the management console failed.
    ProvisioningFailed,
    /// The push channel could not be established in time.
    PushConnectionTimeout,
    /// An unrecoverable integrity or security failure.
    SecurityError,
    /// The management console denied this application.
    AppDenied,
    /// This application version is not entitled to run.
    AppVersionNotEntitled,
    /// The container is blocked by policy.
    Blocked,
    /// The container has been remotely wiped.
    Wiped,
    /// The container is locked out by a remote administrator.
    RemoteLockout,
    /// A password change is required before the session can proceed.
    PasswordChangeRequired,
}

/// A lifecycle event delivered by the platform security subsystem.
///
/// Closed set; the host delegate converts the SDK's callback into exactly one
/// of these and forwards it to [`crate::SecureEnvironment::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum AppEvent {
    /// The authorization handshake reached a terminal "authorized" signal.
    /// Success only when `code` is [`ResultCode::None`].
    Authorized {
        /// Status code qualifying the signal.
        code: ResultCode,
        /// The subsystem's human-readable message.
        message: String,
    },
    /// The handshake reported a "not authorized" signal.
    NotAuthorized {
        /// Status code qualifying the signal.
        code: ResultCode,
        /// The subsystem's human-readable message.
        message: String,
    },
    /// Policy settings changed for this application.
    PolicyUpdate {
        /// The subsystem's human-readable message.
        message: String,
    },
    /// Application-related remote configuration changed.
    RemoteSettingsUpdate {
        /// The subsystem's human-readable message.
        message: String,
    },
    /// Services-related configuration changed.
    ServicesUpdate {
        /// The subsystem's human-readable message.
        message: String,
    },
}

/// What the environment must do in response to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Disposition {
    /// First successful authorization: store the greeting, resolve waiters.
    Ready {
        /// Greeting message to deliver to waiters.
        message: String,
    },
    /// Duplicate "authorized" signal after the first; suppressed.
    AlreadyReady,
    /// Terminal refusal: fail waiters with the code.
    Refused {
        /// The non-benign status code.
        code: ResultCode,
    },
    /// Benign sub-code; waiters keep waiting, nothing changes.
    Benign,
    /// Entitlements changed after authorization; broadcast to subscribers.
    PolicyChanged {
        /// Message to carry on the broadcast.
        message: String,
    },
    /// Event with no bearing on session state.
    Ignored,
}

/// Maps one lifecycle event onto the action the environment must take.
///
/// `ready_once` is true when the environment has reached the authorized state
/// at least once in its lifetime. Idle lockout is the sole benign
/// not-authorized code; policy updates only matter once authorized.
pub(crate) fn classify(ready_once: bool, event: AppEvent) -> Disposition {
    match event {
        AppEvent::Authorized {
            code: ResultCode::None,
            message,
        } => {
            if ready_once {
                Disposition::AlreadyReady
            } else {
                Disposition::Ready { message }
            }
        }
        AppEvent::Authorized { code, .. } => Disposition::Refused { code },
        AppEvent::NotAuthorized {
            code: ResultCode::IdleLockout,
            ..
        } => Disposition::Benign,
        AppEvent::NotAuthorized { code, .. } => Disposition::Refused { code },
        AppEvent::PolicyUpdate { message } => {
            if ready_once {
                Disposition::PolicyChanged { message }
            } else {
                Disposition::Ignored
            }
        }
        AppEvent::RemoteSettingsUpdate { .. } | AppEvent::ServicesUpdate { .. } => {
            Disposition::Ignored
        }
    }
}
