//! Capability invocation: resolve a target peer, filter attachments, and
//! dispatch one cross-application request through the platform transport.

use std::sync::Arc;

use crate::catalog::{CapabilityCatalog, ProviderRegistry};
use crate::error::{CapabilityError, TransportError};
use crate::storage::AttachmentStore;

/// The platform's inter-app transport.
///
/// Implemented by the host; the core depends only on this signature, never on
/// transport internals. `payload` arrives JSON-encoded.
#[uniffi::export(with_foreign)]
pub trait Transport: Send + Sync {
    /// Sends one structured request plus attachments to a peer address.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the transport rejects or cannot
    /// complete the send.
    #[allow(clippy::too_many_arguments)]
    fn send(
        &self,
        address: String,
        capability: String,
        version: String,
        method: String,
        payload: Option<String>,
        attachments: Vec<String>,
    ) -> Result<(), TransportError>;
}

/// One cross-application request. Constructed per invocation, consumed once,
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRequest {
    /// Named capability contract, e.g. `com.good.gfeservice.send-email`.
    /// Must not be empty.
    pub capability: String,
    /// Version of the capability contract.
    pub version: String,
    /// Method of the contract to invoke. Must not be empty.
    pub method: String,
    /// When set, only a peer with exactly this identifier may be selected.
    pub preferred_target: Option<String>,
    /// Structured request parameters, JSON-encoded at the transport seam.
    pub payload: Option<serde_json::Value>,
    /// Paths of attachment files inside the secure container.
    pub attachments: Vec<String>,
}

/// Resolves a capability to a peer and dispatches requests to it.
#[derive(uniffi::Object)]
pub struct CapabilityInvoker {
    catalog: Arc<CapabilityCatalog>,
    transport: Arc<dyn Transport>,
    attachments: Arc<dyn AttachmentStore>,
}

#[uniffi::export]
impl CapabilityInvoker {
    /// Builds the invoker from the three platform collaborators.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(
        registry: Arc<dyn ProviderRegistry>,
        transport: Arc<dyn Transport>,
        attachments: Arc<dyn AttachmentStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog: CapabilityCatalog::new(registry),
            transport,
            attachments,
        })
    }

    /// The catalog this invoker resolves against.
    #[must_use]
    pub fn catalog(&self) -> Arc<CapabilityCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Dispatches a request whose payload is already JSON-encoded; the text
    /// is handed to the transport verbatim.
    ///
    /// # Errors
    ///
    /// See [`CapabilityInvoker::invoke`].
    ///
    /// # Panics
    ///
    /// Panics when `capability` or `method` is empty.
    pub fn invoke_raw(
        &self,
        capability: String,
        version: String,
        method: String,
        preferred_target: Option<String>,
        payload: Option<String>,
        attachments: Vec<String>,
    ) -> Result<(), CapabilityError> {
        self.dispatch(
            &capability,
            &version,
            &method,
            preferred_target.as_deref(),
            payload,
            &attachments,
        )
    }
}

impl CapabilityInvoker {
    /// Resolves the request's target and dispatches it.
    ///
    /// Resolution: query the catalog, filter to the preferred target when one
    /// is set, and select the first remaining peer. A missing peer — or a
    /// selected peer with no address — fails with
    /// [`CapabilityError::DesiredTargetNotFound`] when a preferred target was
    /// named and [`CapabilityError::NoProvider`] otherwise. Attachments that
    /// do not exist in the store are dropped, preserving relative order.
    /// Exactly one transport call per successful resolution; no retries.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::NoProvider`], [`CapabilityError::DesiredTargetNotFound`]
    /// on resolution failure; [`CapabilityError::DispatchFailed`] carrying
    /// the transport's cause unchanged.
    ///
    /// # Panics
    ///
    /// Panics when the request's capability or method is empty; both are
    /// programmer errors, checked before any external call.
    pub fn invoke(&self, request: &CapabilityRequest) -> Result<(), CapabilityError> {
        self.dispatch(
            &request.capability,
            &request.version,
            &request.method,
            request.preferred_target.as_deref(),
            request.payload.as_ref().map(ToString::to_string),
            &request.attachments,
        )
    }

    fn dispatch(
        &self,
        capability: &str,
        version: &str,
        method: &str,
        preferred_target: Option<&str>,
        payload: Option<String>,
        attachments: &[String],
    ) -> Result<(), CapabilityError> {
        assert!(!capability.is_empty(), "capability name must not be empty");
        assert!(!method.is_empty(), "capability method must not be empty");

        let mut peers = self
            .catalog
            .list_peers(capability.to_owned(), Some(version.to_owned()));
        if let Some(target) = preferred_target {
            peers.retain(|peer| peer.identifier == target);
        }
        // an address-less peer is selected and then rejected, same as absence
        let Some(address) = peers.into_iter().next().and_then(|peer| peer.address)
        else {
            return Err(preferred_target.map_or_else(
                || CapabilityError::NoProvider {
                    capability: capability.to_owned(),
                },
                |target| CapabilityError::DesiredTargetNotFound {
                    target: target.to_owned(),
                },
            ));
        };

        let existing: Vec<String> = attachments
            .iter()
            .filter(|path| self.attachments.exists((*path).clone()))
            .cloned()
            .collect();

        log::debug!("dispatching {capability} v{version} {method} to {address}");
        self.transport
            .send(
                address,
                capability.to_owned(),
                version.to_owned(),
                method.to_owned(),
                payload,
                existing,
            )
            .map_err(CapabilityError::from)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use crate::catalog::PeerDescriptor;
    use crate::storage::MemoryAttachmentStore;

    use super::*;

    /// One request as seen by the transport.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) struct SentRequest {
        pub(crate) address: String,
        pub(crate) capability: String,
        pub(crate) version: String,
        pub(crate) method: String,
        pub(crate) payload: Option<String>,
        pub(crate) attachments: Vec<String>,
    }

    /// Transport double that records every send.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingTransport {
        pub(crate) sent: Mutex<Vec<SentRequest>>,
        pub(crate) fail_with: Mutex<Option<TransportError>>,
    }

    impl RecordingTransport {
        pub(crate) fn sent(&self) -> Vec<SentRequest> {
            self.sent.lock().expect("sent lock").clone()
        }
    }

    impl Transport for RecordingTransport {
        fn send(
            &self,
            address: String,
            capability: String,
            version: String,
            method: String,
            payload: Option<String>,
            attachments: Vec<String>,
        ) -> Result<(), TransportError> {
            self.sent.lock().expect("sent lock").push(SentRequest {
                address,
                capability,
                version,
                method,
                payload,
                attachments,
            });
            match self.fail_with.lock().expect("fail lock").take() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    /// Registry double serving a fixed peer list for any capability.
    pub(crate) struct FixedRegistry {
        pub(crate) peers: Vec<PeerDescriptor>,
    }

    impl ProviderRegistry for FixedRegistry {
        fn providers_for(
            &self,
            _capability: String,
            _version: Option<String>,
        ) -> Vec<PeerDescriptor> {
            self.peers.clone()
        }
    }

    pub(crate) fn peer(identifier: &str, address: Option<&str>) -> PeerDescriptor {
        PeerDescriptor {
            identifier: identifier.to_owned(),
            address: address.map(ToOwned::to_owned),
            display_name: identifier.to_owned(),
            version: "1.0.0.0".to_owned(),
            icon: None,
        }
    }

    fn invoker_with(
        peers: Vec<PeerDescriptor>,
    ) -> (Arc<CapabilityInvoker>, Arc<RecordingTransport>, Arc<MemoryAttachmentStore>)
    {
        let transport = Arc::new(RecordingTransport::default());
        let store = Arc::new(MemoryAttachmentStore::new());
        let invoker = CapabilityInvoker::new(
            Arc::new(FixedRegistry { peers }),
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&store) as Arc<dyn AttachmentStore>,
        );
        (invoker, transport, store)
    }

    fn request(capability: &str, method: &str) -> CapabilityRequest {
        CapabilityRequest {
            capability: capability.to_owned(),
            version: "1.0.0.0".to_owned(),
            method: method.to_owned(),
            preferred_target: None,
            payload: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_empty_capability_panics_before_any_dispatch() {
        let (invoker, transport, _) =
            invoker_with(vec![peer("app.a", Some("addr1"))]);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            invoker.invoke(&request("", "doIt"))
        }));
        assert!(outcome.is_err());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_empty_method_panics_before_any_dispatch() {
        let (invoker, transport, _) =
            invoker_with(vec![peer("app.a", Some("addr1"))]);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            invoker.invoke(&request("com.example.service", ""))
        }));
        assert!(outcome.is_err());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_address_less_preferred_target_is_not_found() {
        let (invoker, transport, _) = invoker_with(vec![
            peer("a", Some("addr1")),
            peer("b", None),
        ]);
        let mut req = request("com.example.service", "doIt");
        req.preferred_target = Some("b".to_owned());
        assert_eq!(
            invoker.invoke(&req),
            Err(CapabilityError::DesiredTargetNotFound {
                target: "b".to_owned()
            })
        );
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_first_peer_wins_without_preferred_target() {
        let (invoker, transport, _) = invoker_with(vec![
            peer("a", Some("addr1")),
            peer("b", None),
        ]);
        invoker
            .invoke(&request("com.example.service", "doIt"))
            .expect("dispatch");
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].address, "addr1");
        assert_eq!(sent[0].method, "doIt");
    }

    #[test]
    fn test_empty_catalog_is_no_provider() {
        let (invoker, transport, _) = invoker_with(Vec::new());
        assert_eq!(
            invoker.invoke(&request("com.example.service", "doIt")),
            Err(CapabilityError::NoProvider {
                capability: "com.example.service".to_owned()
            })
        );
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_attachment_filter_preserves_order_and_drops_missing() {
        let (invoker, transport, store) =
            invoker_with(vec![peer("a", Some("addr1"))]);
        store.insert("/a.txt");
        store.insert("/b.txt");

        let mut req = request("com.example.service", "doIt");
        req.attachments = vec![
            "/a.txt".to_owned(),
            "/missing.txt".to_owned(),
            "/b.txt".to_owned(),
        ];
        invoker.invoke(&req).expect("dispatch");
        assert_eq!(transport.sent()[0].attachments, vec![
            "/a.txt".to_owned(),
            "/b.txt".to_owned()
        ]);
    }

    #[test]
    fn test_transport_failure_wraps_cause_unchanged() {
        let (invoker, transport, _) =
            invoker_with(vec![peer("a", Some("addr1"))]);
        *transport.fail_with.lock().expect("fail lock") =
            Some(TransportError::Send {
                reason: "peer rejected".to_owned(),
            });
        assert_eq!(
            invoker.invoke(&request("com.example.service", "doIt")),
            Err(CapabilityError::DispatchFailed(TransportError::Send {
                reason: "peer rejected".to_owned()
            }))
        );
    }

    #[test]
    fn test_payload_is_json_encoded_at_the_seam() {
        let (invoker, transport, _) =
            invoker_with(vec![peer("a", Some("addr1"))]);
        let mut req = request("com.example.service", "doIt");
        req.payload = Some(serde_json::json!({ "key": "value" }));
        invoker.invoke(&req).expect("dispatch");
        assert_eq!(
            transport.sent()[0].payload.as_deref(),
            Some(r#"{"key":"value"}"#)
        );
    }

    #[test]
    fn test_invoke_raw_passes_payload_verbatim() {
        let (invoker, transport, _) =
            invoker_with(vec![peer("a", Some("addr1"))]);
        invoker
            .invoke_raw(
                "com.example.service".to_owned(),
                "1.0.0.0".to_owned(),
                "doIt".to_owned(),
                None,
                Some("{\"already\":\"encoded\"}".to_owned()),
                Vec::new(),
            )
            .expect("dispatch");
        assert_eq!(
            transport.sent()[0].payload.as_deref(),
            Some("{\"already\":\"encoded\"}")
        );
    }
}
