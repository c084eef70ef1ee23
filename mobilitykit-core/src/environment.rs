//! Secure-session bootstrap.
//!
//! One [`SecureEnvironment`] is constructed at process start, holding the
//! platform's [`AuthorizationHandshake`], and is passed explicitly to every
//! consumer. Lifecycle events come back from the platform delegate through
//! [`SecureEnvironment::handle_event`]; pending [`SecureEnvironment::become_ready`]
//! callers wait in a FIFO queue and are all resolved, in arrival order, by
//! the same terminal event.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, oneshot};

use crate::error::AuthorizationError;
use crate::events::{classify, AppEvent, Disposition, ResultCode};

/// Buffered policy notices per subscriber before the oldest is dropped.
const POLICY_CHANNEL_CAPACITY: usize = 16;

/// Where the environment currently stands in the authorization lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum AuthorizationState {
    /// No handshake has been started yet.
    Unauthorized,
    /// A handshake is in flight; callers are queued.
    Authorizing,
    /// The handshake succeeded. Reached at most once per environment.
    Authorized,
    /// The handshake terminated with a non-benign refusal.
    Failed {
        /// The status code of the refusal.
        code: ResultCode,
    },
}

/// Notice that application policy or entitlements changed after the
/// environment first became authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyNotice {
    /// The security subsystem's human-readable message.
    pub message: String,
}

/// Starts the platform security SDK's authorization flow.
///
/// Implemented by the host: `authorize` must kick off the SDK's handshake
/// (typically presenting its unlock UI); resulting lifecycle events are fed
/// back through [`SecureEnvironment::handle_event`].
#[uniffi::export(with_foreign)]
pub trait AuthorizationHandshake: Send + Sync {
    /// Starts (or resumes) the platform authorization flow.
    fn authorize(&self);
}

type Waiter = oneshot::Sender<Result<String, AuthorizationError>>;

struct Inner {
    state: AuthorizationState,
    /// Set on the first successful authorization, never cleared. Doubles as
    /// the "reached Authorized at least once" marker for event dispositions.
    greeting: Option<String>,
    waiters: VecDeque<Waiter>,
}

/// Owns the one-time authorization handshake with the platform security SDK.
#[derive(uniffi::Object)]
pub struct SecureEnvironment {
    handshake: Arc<dyn AuthorizationHandshake>,
    inner: Mutex<Inner>,
    policy_updates: broadcast::Sender<PolicyNotice>,
}

#[uniffi::export(async_runtime = "tokio")]
impl SecureEnvironment {
    /// Creates the environment around the platform handshake. Construct once
    /// at process start and inject wherever a secure session is needed.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(handshake: Arc<dyn AuthorizationHandshake>) -> Arc<Self> {
        let (policy_updates, _) = broadcast::channel(POLICY_CHANNEL_CAPACITY);
        Arc::new(Self {
            handshake,
            inner: Mutex::new(Inner {
                state: AuthorizationState::Unauthorized,
                greeting: None,
                waiters: VecDeque::new(),
            }),
            policy_updates,
        })
    }

    /// Waits until the environment is authorized, starting the platform
    /// handshake if none is in flight.
    ///
    /// Concurrent callers are queued and all resolved in arrival order by the
    /// same terminal event. Once authorized, later calls resolve immediately
    /// with the stored greeting message. A call after a failure starts a
    /// fresh handshake; failures are never retried internally.
    ///
    /// # Errors
    ///
    /// [`AuthorizationError::Refused`] when the subsystem denies the session
    /// with a non-benign code; [`AuthorizationError::HandshakeAbandoned`]
    /// when the environment is dropped mid-handshake.
    pub async fn become_ready(&self) -> Result<String, AuthorizationError> {
        let (rx, start_handshake) = {
            let mut inner = self.lock();
            match inner.state {
                AuthorizationState::Authorized => {
                    // greeting is set on the transition into Authorized
                    return Ok(inner.greeting.clone().unwrap_or_default());
                }
                AuthorizationState::Authorizing => {
                    let (tx, rx) = oneshot::channel();
                    inner.waiters.push_back(tx);
                    (rx, false)
                }
                AuthorizationState::Unauthorized
                | AuthorizationState::Failed { .. } => {
                    inner.state = AuthorizationState::Authorizing;
                    let (tx, rx) = oneshot::channel();
                    inner.waiters.push_back(tx);
                    (rx, true)
                }
            }
        };
        if start_handshake {
            self.handshake.authorize();
        }
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthorizationError::HandshakeAbandoned),
        }
    }

    /// Applies one lifecycle event from the platform delegate.
    ///
    /// Exactly one disposition per event: terminal signals resolve every
    /// queued waiter, benign and duplicate signals are suppressed, and policy
    /// changes after first authorization are re-broadcast to subscribers.
    pub fn handle_event(&self, event: AppEvent) {
        let (resolved, outcome) = {
            let mut inner = self.lock();
            match classify(inner.greeting.is_some(), event) {
                Disposition::Ready { message } => {
                    log::info!("secure session established");
                    inner.state = AuthorizationState::Authorized;
                    inner.greeting = Some(message.clone());
                    let waiters: Vec<Waiter> = inner.waiters.drain(..).collect();
                    (waiters, Some(Ok(message)))
                }
                Disposition::Refused { code } => {
                    log::warn!("authorization refused: {code}");
                    inner.state = AuthorizationState::Failed { code };
                    let waiters: Vec<Waiter> = inner.waiters.drain(..).collect();
                    (waiters, Some(Err(AuthorizationError::Refused { code })))
                }
                Disposition::AlreadyReady => {
                    log::debug!("duplicate authorized signal suppressed");
                    (Vec::new(), None)
                }
                Disposition::Benign => {
                    log::debug!("benign lockout, waiters keep waiting");
                    (Vec::new(), None)
                }
                Disposition::PolicyChanged { message } => {
                    log::info!("application policy updated");
                    // no subscribers is fine
                    let _ = self.policy_updates.send(PolicyNotice { message });
                    (Vec::new(), None)
                }
                Disposition::Ignored => (Vec::new(), None),
            }
        };
        if let Some(outcome) = outcome {
            for waiter in resolved {
                // a waiter whose future was dropped no longer cares
                let _ = waiter.send(outcome.clone());
            }
        }
    }

    /// Reports where the environment currently stands.
    #[must_use]
    pub fn state(&self) -> AuthorizationState {
        self.lock().state.clone()
    }
}

impl SecureEnvironment {
    /// Subscribes to policy-update notices. Notices are only emitted once the
    /// environment has been authorized at least once.
    #[must_use]
    pub fn subscribe_policy_updates(&self) -> broadcast::Receiver<PolicyNotice> {
        self.policy_updates.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;

    struct CountingHandshake {
        starts: AtomicUsize,
    }

    impl CountingHandshake {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                starts: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }
    }

    impl AuthorizationHandshake for CountingHandshake {
        fn authorize(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn authorized_event(message: &str) -> AppEvent {
        AppEvent::Authorized {
            code: ResultCode::None,
            message: message.to_owned(),
        }
    }

    #[test]
    fn test_become_ready_resolves_on_authorized_event() {
        let handshake = CountingHandshake::new();
        let environment = SecureEnvironment::new(handshake.clone());

        let mut waiter = task::spawn(environment.become_ready());
        assert_pending!(waiter.poll());
        assert_eq!(environment.state(), AuthorizationState::Authorizing);
        assert_eq!(handshake.count(), 1);

        environment.handle_event(authorized_event("welcome"));
        assert_eq!(assert_ready!(waiter.poll()), Ok("welcome".to_owned()));
        assert_eq!(environment.state(), AuthorizationState::Authorized);
    }

    #[test]
    fn test_concurrent_waiters_all_resolve_in_order() {
        let handshake = CountingHandshake::new();
        let environment = SecureEnvironment::new(handshake.clone());

        let mut first = task::spawn(environment.become_ready());
        let mut second = task::spawn(environment.become_ready());
        assert_pending!(first.poll());
        assert_pending!(second.poll());
        // only the first caller starts the handshake
        assert_eq!(handshake.count(), 1);

        environment.handle_event(authorized_event("welcome"));
        assert_eq!(assert_ready!(first.poll()), Ok("welcome".to_owned()));
        assert_eq!(assert_ready!(second.poll()), Ok("welcome".to_owned()));
    }

    #[test]
    fn test_duplicate_authorized_event_is_suppressed() {
        let environment = SecureEnvironment::new(CountingHandshake::new());

        let mut waiter = task::spawn(environment.become_ready());
        assert_pending!(waiter.poll());
        environment.handle_event(authorized_event("first"));
        assert_eq!(assert_ready!(waiter.poll()), Ok("first".to_owned()));

        // second delivery: no state change, and late callers still see the
        // original greeting
        environment.handle_event(authorized_event("second"));
        assert_eq!(environment.state(), AuthorizationState::Authorized);
        let mut late = task::spawn(environment.become_ready());
        assert_eq!(assert_ready!(late.poll()), Ok("first".to_owned()));
    }

    #[test]
    fn test_benign_lockout_keeps_waiters_pending() {
        let environment = SecureEnvironment::new(CountingHandshake::new());

        let mut waiter = task::spawn(environment.become_ready());
        assert_pending!(waiter.poll());

        environment.handle_event(AppEvent::NotAuthorized {
            code: ResultCode::IdleLockout,
            message: "locked".to_owned(),
        });
        assert_pending!(waiter.poll());
        assert_eq!(environment.state(), AuthorizationState::Authorizing);

        environment.handle_event(authorized_event("back"));
        assert_eq!(assert_ready!(waiter.poll()), Ok("back".to_owned()));
    }

    #[test]
    fn test_refusal_fails_waiters_and_allows_restart() {
        let handshake = CountingHandshake::new();
        let environment = SecureEnvironment::new(handshake.clone());

        let mut waiter = task::spawn(environment.become_ready());
        assert_pending!(waiter.poll());
        environment.handle_event(AppEvent::NotAuthorized {
            code: ResultCode::AppDenied,
            message: "denied".to_owned(),
        });
        assert_eq!(
            assert_ready!(waiter.poll()),
            Err(AuthorizationError::Refused {
                code: ResultCode::AppDenied
            })
        );
        assert_eq!(environment.state(), AuthorizationState::Failed {
            code: ResultCode::AppDenied
        });

        // retry is the caller's decision; a new call restarts the handshake
        let mut retry = task::spawn(environment.become_ready());
        assert_pending!(retry.poll());
        assert_eq!(handshake.count(), 2);
        environment.handle_event(authorized_event("welcome"));
        assert_eq!(assert_ready!(retry.poll()), Ok("welcome".to_owned()));
    }

    #[test]
    fn test_authorized_with_error_code_fails_waiters() {
        let environment = SecureEnvironment::new(CountingHandshake::new());

        let mut waiter = task::spawn(environment.become_ready());
        assert_pending!(waiter.poll());
        environment.handle_event(AppEvent::Authorized {
            code: ResultCode::Wiped,
            message: "wiped".to_owned(),
        });
        assert_eq!(
            assert_ready!(waiter.poll()),
            Err(AuthorizationError::Refused {
                code: ResultCode::Wiped
            })
        );
    }

    #[test]
    fn test_policy_updates_broadcast_only_after_ready() {
        let environment = SecureEnvironment::new(CountingHandshake::new());
        let mut notices = environment.subscribe_policy_updates();

        environment.handle_event(AppEvent::PolicyUpdate {
            message: "early".to_owned(),
        });
        assert!(notices.try_recv().is_err());

        let mut waiter = task::spawn(environment.become_ready());
        assert_pending!(waiter.poll());
        environment.handle_event(authorized_event("welcome"));
        assert_eq!(assert_ready!(waiter.poll()), Ok("welcome".to_owned()));

        environment.handle_event(AppEvent::PolicyUpdate {
            message: "entitlements changed".to_owned(),
        });
        assert_eq!(
            notices.try_recv(),
            Ok(PolicyNotice {
                message: "entitlements changed".to_owned()
            })
        );
    }

    #[test]
    fn test_settings_updates_touch_nothing() {
        let environment = SecureEnvironment::new(CountingHandshake::new());
        let mut waiter = task::spawn(environment.become_ready());
        assert_pending!(waiter.poll());

        environment.handle_event(AppEvent::RemoteSettingsUpdate {
            message: "config".to_owned(),
        });
        environment.handle_event(AppEvent::ServicesUpdate {
            message: "services".to_owned(),
        });
        assert_pending!(waiter.poll());
        assert_eq!(environment.state(), AuthorizationState::Authorizing);
    }
}
