//! Mock staking token with injectable transfer failures.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::TokenError;
use crate::indexer::{StakingToken, TokenLedger};
use crate::types::{Address, Score};

/// Types of failures that can be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockTokenFailure {
    /// `transfer_from` returns `Ok(false)`
    RefusePull,
    /// `transfer` returns `Ok(false)`
    RefuseRefund,
    /// `transfer_from` returns `Err`
    FailPull,
    /// `transfer` returns `Err`
    FailRefund,
}

/// Handle that arms or clears a [`MockToken`]'s failure after the token
/// has been moved into a registry.
#[derive(Debug, Clone, Default)]
pub struct FailureSwitch {
    inner: Arc<RwLock<Option<MockTokenFailure>>>,
}

impl FailureSwitch {
    pub fn set(&self, failure: Option<MockTokenFailure>) {
        *self.inner.write() = failure;
    }

    pub fn get(&self) -> Option<MockTokenFailure> {
        *self.inner.read()
    }
}

/// Real [`TokenLedger`] underneath, with an optional failure on top.
///
/// A refused or failed movement leaves balances untouched, like a
/// reverting token contract.
#[derive(Debug, Clone)]
pub struct MockToken {
    ledger: TokenLedger,
    failure: FailureSwitch,
    pulls: usize,
    refunds: usize,
}

impl MockToken {
    pub fn new(address: Address) -> Self {
        Self { ledger: TokenLedger::new(address), failure: FailureSwitch::default(), pulls: 0, refunds: 0 }
    }

    /// Shared handle to this token's failure setting.
    pub fn switch(&self) -> FailureSwitch {
        self.failure.clone()
    }

    /// Mint `amount` to `account` and let `spender` use all of it.
    pub fn fund(&mut self, account: Address, spender: Address, amount: Score) -> Result<(), TokenError> {
        self.ledger.mint(account, amount)?;
        self.ledger.approve(account, spender, Score::MAX);
        Ok(())
    }

    pub fn set_failure(&self, failure: Option<MockTokenFailure>) {
        self.failure.set(failure);
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    /// Successful `transfer_from` calls.
    pub fn pulls(&self) -> usize {
        self.pulls
    }

    /// Successful `transfer` calls.
    pub fn refunds(&self) -> usize {
        self.refunds
    }
}

impl StakingToken for MockToken {
    fn address(&self) -> Address {
        self.ledger.address()
    }

    fn balance_of(&self, account: &Address) -> Score {
        self.ledger.balance_of(account)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Score,
    ) -> Result<bool, TokenError> {
        match self.failure.get() {
            Some(MockTokenFailure::RefusePull) => return Ok(false),
            Some(MockTokenFailure::FailPull) => return Err(TokenError::Rejected("mock pull failure".into())),
            _ => {}
        }
        let moved = self.ledger.transfer_from(spender, from, to, amount)?;
        self.pulls += 1;
        Ok(moved)
    }

    fn transfer(&mut self, sender: Address, to: Address, amount: Score) -> Result<bool, TokenError> {
        match self.failure.get() {
            Some(MockTokenFailure::RefuseRefund) => return Ok(false),
            Some(MockTokenFailure::FailRefund) => return Err(TokenError::Rejected("mock refund failure".into())),
            _ => {}
        }
        let moved = self.ledger.transfer(sender, to, amount)?;
        self.refunds += 1;
        Ok(moved)
    }
}
