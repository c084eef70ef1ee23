//! Capability catalog: which installed peer applications can service a
//! named, versioned capability.

use std::sync::Arc;

/// Metadata identifying one installed application able to service a
/// capability. Produced fresh on every query; never cached, so it always
/// reflects the current registry state.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PeerDescriptor {
    /// Stable application identifier (native bundle / package identifier).
    pub identifier: String,
    /// Routable inter-app address. Absent when the peer is registered but
    /// not currently reachable; such peers are unusable dispatch targets.
    pub address: Option<String>,
    /// Human-readable application name.
    pub display_name: String,
    /// Version of the capability contract the peer implements.
    pub version: String,
    /// Encoded application icon, when the registry has one.
    pub icon: Option<Vec<u8>>,
}

/// The platform SDK's registry of capability providers.
///
/// Implemented by the host; queried read-only.
#[uniffi::export(with_foreign)]
pub trait ProviderRegistry: Send + Sync {
    /// Returns the peers registered for `capability`, optionally constrained
    /// to a contract `version`. Empty when none are installed.
    fn providers_for(
        &self,
        capability: String,
        version: Option<String>,
    ) -> Vec<PeerDescriptor>;
}

/// Pure query facade over the platform provider registry.
#[derive(uniffi::Object)]
pub struct CapabilityCatalog {
    registry: Arc<dyn ProviderRegistry>,
}

#[uniffi::export]
impl CapabilityCatalog {
    /// Wraps the platform registry.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(registry: Arc<dyn ProviderRegistry>) -> Arc<Self> {
        Arc::new(Self { registry })
    }

    /// Lists the peers currently registered for `capability`.
    ///
    /// No caching and no side effects; an empty result is the normal outcome
    /// when no provider is installed, never an error.
    #[must_use]
    pub fn list_peers(
        &self,
        capability: String,
        version: Option<String>,
    ) -> Vec<PeerDescriptor> {
        self.registry.providers_for(capability, version)
    }
}
