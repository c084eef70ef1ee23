//! Email capability: the "compose email" specialization of the generic
//! invoker, fixed to the well-known enterprise email client.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::defaults::{
    EMAIL_PROVIDER_ID, SEND_EMAIL_METHOD, SEND_EMAIL_SERVICE, SEND_EMAIL_VERSION,
};
use crate::error::CapabilityError;
use crate::invoker::{CapabilityInvoker, CapabilityRequest};

/// Composes email in the well-known enterprise email client via the
/// cross-application email service.
#[derive(uniffi::Object)]
pub struct EmailCapability {
    invoker: Arc<CapabilityInvoker>,
}

#[uniffi::export]
impl EmailCapability {
    /// Binds the capability to an invoker.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(invoker: Arc<CapabilityInvoker>) -> Arc<Self> {
        Arc::new(Self { invoker })
    }

    /// Hands an email off to the enterprise email client for composition.
    ///
    /// The payload carries only the keys that have values: `to` (omitted for
    /// an empty recipient list), `subject`, `body`. An entirely empty email
    /// is still a valid request and is dispatched.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::DesiredTargetNotFound`] when the email client is
    /// not installed — check [`requires_email_app_install`] to drive the
    /// install remediation — and the other [`CapabilityError`] cases as for
    /// any invocation.
    pub fn compose_email(
        &self,
        to: Vec<String>,
        subject: Option<String>,
        body: Option<String>,
        attachments: Vec<String>,
    ) -> Result<(), CapabilityError> {
        let mut payload = Map::new();
        if !to.is_empty() {
            payload.insert("to".to_owned(), Value::from(to));
        }
        if let Some(subject) = subject {
            payload.insert("subject".to_owned(), Value::String(subject));
        }
        if let Some(body) = body {
            payload.insert("body".to_owned(), Value::String(body));
        }

        self.invoker.invoke(&CapabilityRequest {
            capability: SEND_EMAIL_SERVICE.to_owned(),
            version: SEND_EMAIL_VERSION.to_owned(),
            method: SEND_EMAIL_METHOD.to_owned(),
            preferred_target: Some(EMAIL_PROVIDER_ID.to_owned()),
            payload: Some(Value::Object(payload)),
            attachments,
        })
    }
}

/// True exactly when `error` means the well-known email client is missing,
/// in which case the host should offer installation from
/// [`crate::defaults::EMAIL_PROVIDER_INSTALL_URL`]. Every other failure is a
/// generic error to the user.
#[must_use]
pub fn requires_email_app_install(error: &CapabilityError) -> bool {
    matches!(
        error,
        CapabilityError::DesiredTargetNotFound { target } if target == EMAIL_PROVIDER_ID
    )
}
