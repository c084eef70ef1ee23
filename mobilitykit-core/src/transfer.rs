//! File-transfer capability: hand a secure-container file to a peer viewer
//! application via the cross-application transfer service.

use std::sync::Arc;

use crate::catalog::PeerDescriptor;
use crate::defaults::{
    TRANSFER_FILE_METHOD, TRANSFER_FILE_SERVICE, TRANSFER_FILE_VERSION,
};
use crate::error::CapabilityError;
use crate::invoker::{CapabilityInvoker, CapabilityRequest};

/// Transfers files from the secure container to a chosen peer viewer app.
#[derive(uniffi::Object)]
pub struct FileTransferCapability {
    invoker: Arc<CapabilityInvoker>,
}

#[uniffi::export]
impl FileTransferCapability {
    /// Binds the capability to an invoker.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(invoker: Arc<CapabilityInvoker>) -> Arc<Self> {
        Arc::new(Self { invoker })
    }

    /// Lists the installed applications able to receive a transferred file.
    /// Empty when none are installed; the host then falls back to in-app
    /// viewing.
    #[must_use]
    pub fn viewer_apps(&self) -> Vec<PeerDescriptor> {
        self.invoker.catalog().list_peers(
            TRANSFER_FILE_SERVICE.to_owned(),
            Some(TRANSFER_FILE_VERSION.to_owned()),
        )
    }

    /// Sends the file at `path` to the viewer application `target`.
    ///
    /// The file travels as the request's sole attachment; there is no
    /// payload. A `path` that does not exist in the container results in a
    /// dispatch with no attachments, which the peer reports through the
    /// transport.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::DesiredTargetNotFound`] when `target` is not
    /// installed or has no usable address; [`CapabilityError::DispatchFailed`]
    /// when the transport rejects the transfer.
    pub fn transfer_file(
        &self,
        target: String,
        path: String,
    ) -> Result<(), CapabilityError> {
        self.invoker.invoke(&CapabilityRequest {
            capability: TRANSFER_FILE_SERVICE.to_owned(),
            version: TRANSFER_FILE_VERSION.to_owned(),
            method: TRANSFER_FILE_METHOD.to_owned(),
            preferred_target: Some(target),
            payload: None,
            attachments: vec![path],
        })
    }
}
