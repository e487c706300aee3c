//! Mock locator whitelist that records lookups.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::indexer::{LocatorWhitelist, StaticWhitelist};
use crate::types::{Address, Locator};

/// Whitelist whose approvals can change after it is installed, and which
/// counts how often it was consulted.
///
/// Clones share state, so a test can keep one clone and hand the other to
/// the registry.
#[derive(Debug, Clone)]
pub struct MockWhitelist {
    inner: Arc<RwLock<StaticWhitelist>>,
    lookups: Arc<AtomicUsize>,
}

impl MockWhitelist {
    pub fn new(address: Address) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StaticWhitelist::new(address))),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn approve(&self, locator: Locator) {
        self.inner.write().approve(locator);
    }

    pub fn revoke(&self, locator: &Locator) {
        self.inner.write().revoke(locator);
    }

    /// Number of `is_whitelisted` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl LocatorWhitelist for MockWhitelist {
    fn address(&self) -> Address {
        self.inner.read().address()
    }

    fn is_whitelisted(&self, locator: &Locator) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.read().is_whitelisted(locator)
    }
}
