//! Staking token seam.
//!
//! The registry escrows stake in an ERC20-style token it does not control.
//! [`StakingToken`] is the narrow surface it needs; [`TokenLedger`] is a
//! complete in-memory implementation for hosts without a real chain.

use std::collections::HashMap;

use tracing::trace;

use crate::error::TokenError;
use crate::types::{Address, Score};

/// ERC20-style token the registry pulls stake from and refunds stake to.
///
/// Both movement calls report success as `Ok(true)`. `Ok(false)` is a
/// refusal without a reason; the registry treats it exactly like `Err`.
pub trait StakingToken {
    /// Token contract address, as used in blacklists and market keys.
    fn address(&self) -> Address;

    fn balance_of(&self, account: &Address) -> Score;

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Score,
    ) -> Result<bool, TokenError>;

    /// Move `amount` out of `sender`'s own balance.
    fn transfer(&mut self, sender: Address, to: Address, amount: Score) -> Result<bool, TokenError>;
}

/// In-memory token with balances and allowances.
///
/// An allowance of `Score::MAX` is treated as unlimited and never
/// decremented.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    address: Address,
    balances: HashMap<Address, Score>,
    allowances: HashMap<(Address, Address), Score>,
    total_supply: Score,
}

impl TokenLedger {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// Credit `amount` new tokens to `to`.
    pub fn mint(&mut self, to: Address, amount: Score) -> Result<(), TokenError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| TokenError::Rejected("total supply overflow".into()))?;
        let balance = self.balances.entry(to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TokenError::Rejected("balance overflow".into()))?;
        self.total_supply = supply;
        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s tokens.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Score) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Score {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    #[inline]
    pub fn total_supply(&self) -> Score {
        self.total_supply
    }

    fn debit(&mut self, account: Address, amount: Score) -> Result<(), TokenError> {
        let balance = self.balance_of(&account);
        if balance < amount {
            return Err(TokenError::InsufficientBalance { account, balance, needed: amount });
        }
        self.balances.insert(account, balance - amount);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: Score) {
        // Cannot overflow: every unit credited was debited or minted first
        let balance = self.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }
}

impl StakingToken for TokenLedger {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> Score {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Score,
    ) -> Result<bool, TokenError> {
        let allowance = self.allowance(&from, &spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance { owner: from, spender, allowance, needed: amount });
        }

        self.debit(from, amount)?;
        self.credit(to, amount);
        if allowance != Score::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }

        trace!(%from, %to, amount, "transfer_from");
        Ok(true)
    }

    fn transfer(&mut self, sender: Address, to: Address, amount: Score) -> Result<bool, TokenError> {
        self.debit(sender, amount)?;
        self.credit(to, amount);

        trace!(%sender, %to, amount, "transfer");
        Ok(true)
    }
}
