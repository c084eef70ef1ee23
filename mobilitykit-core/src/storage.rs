//! Attachment storage seam.
//!
//! Attachments are referenced by path inside the platform's secure file
//! container; the core only ever asks whether a path exists before
//! dispatching it. The host supplies the container-backed implementation;
//! [`NativeAttachmentStore`] and [`MemoryAttachmentStore`] cover plain-
//! filesystem use and tests.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Read-only existence checks against the store holding attachment files.
#[uniffi::export(with_foreign)]
pub trait AttachmentStore: Send + Sync {
    /// True when a file exists at `path` in the store.
    fn exists(&self, path: String) -> bool;
}

/// [`AttachmentStore`] backed by the ordinary local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeAttachmentStore;

impl NativeAttachmentStore {
    /// Creates the store. Stateless.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AttachmentStore for NativeAttachmentStore {
    fn exists(&self, path: String) -> bool {
        std::path::Path::new(&path).exists()
    }
}

/// In-memory [`AttachmentStore`] for tests and host simulators.
#[derive(Debug, Default)]
pub struct MemoryAttachmentStore {
    paths: Mutex<HashSet<String>>,
}

impl MemoryAttachmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as existing.
    pub fn insert(&self, path: impl Into<String>) {
        self.lock().insert(path.into());
    }

    /// Removes `path` from the store.
    pub fn remove(&self, path: &str) {
        self.lock().remove(path);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AttachmentStore for MemoryAttachmentStore {
    fn exists(&self, path: String) -> bool {
        self.lock().contains(&path)
    }
}
