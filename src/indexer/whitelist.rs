//! Locator whitelist seam.

use std::collections::HashSet;

use crate::types::{Address, Locator};

/// External approval list a market can require locators to appear on.
pub trait LocatorWhitelist: Send + Sync {
    /// Address announced in `SetLocatorWhitelist` events.
    fn address(&self) -> Address;

    fn is_whitelisted(&self, locator: &Locator) -> bool;
}

/// Fixed set of approved locators.
#[derive(Debug, Clone, Default)]
pub struct StaticWhitelist {
    address: Address,
    approved: HashSet<Locator>,
}

impl StaticWhitelist {
    pub fn new(address: Address) -> Self {
        Self { address, approved: HashSet::new() }
    }

    pub fn with_locators(address: Address, locators: impl IntoIterator<Item = Locator>) -> Self {
        Self { address, approved: locators.into_iter().collect() }
    }

    pub fn approve(&mut self, locator: Locator) {
        self.approved.insert(locator);
    }

    pub fn revoke(&mut self, locator: &Locator) -> bool {
        self.approved.remove(locator)
    }

    pub fn len(&self) -> usize {
        self.approved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
    }
}

impl LocatorWhitelist for StaticWhitelist {
    fn address(&self) -> Address {
        self.address
    }

    fn is_whitelisted(&self, locator: &Locator) -> bool {
        self.approved.contains(locator)
    }
}
