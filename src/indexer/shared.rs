//! Thread-shared registry handle.
//!
//! An [`Indexer`] is already serialized by `&mut self`. `SharedIndexer`
//! lets several threads reach one registry; each closure passed to
//! [`transact`](SharedIndexer::transact) or [`read`](SharedIndexer::read)
//! runs under the lock as a single transaction.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::indexer::{Indexer, StakingToken};

/// Cloneable, lock-guarded handle to one [`Indexer`].
pub struct SharedIndexer<T: StakingToken> {
    inner: Arc<Mutex<Indexer<T>>>,
}

impl<T: StakingToken> Clone for SharedIndexer<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: StakingToken> fmt::Debug for SharedIndexer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(indexer) => f.debug_tuple("SharedIndexer").field(&*indexer).finish(),
            None => f.write_str("SharedIndexer(<locked>)"),
        }
    }
}

impl<T: StakingToken> SharedIndexer<T> {
    pub fn new(indexer: Indexer<T>) -> Self {
        Self { inner: Arc::new(Mutex::new(indexer)) }
    }

    /// Run `f` with exclusive access. Nothing else observes the registry
    /// until `f` returns.
    pub fn transact<R>(&self, f: impl FnOnce(&mut Indexer<T>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Run `f` against a consistent snapshot of the registry.
    pub fn read<R>(&self, f: impl FnOnce(&Indexer<T>) -> R) -> R {
        let guard = self.inner.lock();
        f(&*guard)
    }

    /// Recover the registry if this is the last handle.
    pub fn try_into_inner(self) -> Result<Indexer<T>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::TokenLedger;
    use crate::types::{Address, Locator, Score};

    #[test]
    fn test_transact_and_read() {
        let custody = Address::from_low_u64_be(0xcc);
        let alice = Address::from_low_u64_be(1);
        let mut token = TokenLedger::new(Address::from_low_u64_be(0xa57));
        token.mint(alice, 100).unwrap();
        token.approve(alice, custody, Score::MAX);

        let shared = SharedIndexer::new(Indexer::new(Address::from_low_u64_be(0xaa), custody, token));
        let handle = shared.clone();

        let market = handle
            .transact(|indexer| {
                let market = indexer.create_index(alice, Address::from_low_u64_be(2), Address::from_low_u64_be(3), None)?;
                indexer.set_intent(alice, market, 40, Locator::from_address(alice))?;
                Ok::<_, crate::error::IndexerError>(market)
            })
            .unwrap();

        assert_eq!(shared.read(|indexer| indexer.get_staked_amount(&alice, &market)), 40);

        drop(handle);
        let indexer = shared.try_into_inner().unwrap();
        assert_eq!(indexer.total_escrowed(), 40);
    }
}
