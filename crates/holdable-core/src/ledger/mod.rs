//! Per-account balance accounting with hold-aware gating.
//!
//! [`BalanceBook`] owns the total supply, every account's gross balance, the
//! amount each account currently has on hold, and spender allowances. The
//! spendable ("available") balance is always the gross balance minus the
//! held amount; every outbound transfer is gated on it.
//!
//! Hold bookkeeping itself ([`add_held`], [`release_held`],
//! [`settle_hold`]) is crate-internal: only the engine moves value in and
//! out of the held column, and it does so only after full validation, so
//! those paths never underflow.
//!
//! [`add_held`]: BalanceBook::add_held
//! [`release_held`]: BalanceBook::release_held
//! [`settle_hold`]: BalanceBook::settle_hold

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hold::ValidationError;

/// Total, held, and available balances for every account, plus supply
/// counters and ERC-20-style spender allowances.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceBook {
    /// Gross (net) balance per account.
    balances: HashMap<String, u64>,
    /// Amount currently locked by active holds, per account.
    held: HashMap<String, u64>,
    /// Owner -> spender -> remaining allowance.
    allowances: HashMap<String, HashMap<String, u64>>,
    /// Sum of all gross balances.
    total_supply: u64,
    /// Sum of all held amounts.
    total_on_hold: u64,
}

impl BalanceBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the gross (net) balance of an account.
    #[must_use]
    pub fn total_of(&self, account: &str) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Returns the amount an account currently has locked in active holds.
    #[must_use]
    pub fn held_of(&self, account: &str) -> u64 {
        self.held.get(account).copied().unwrap_or(0)
    }

    /// Returns the spendable balance: gross minus held.
    #[must_use]
    pub fn available_of(&self, account: &str) -> u64 {
        self.total_of(account).saturating_sub(self.held_of(account))
    }

    /// Returns the sum of all gross balances.
    #[must_use]
    pub const fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Returns the sum of all held amounts across accounts.
    #[must_use]
    pub const fn total_on_hold(&self) -> u64 {
        self.total_on_hold
    }

    /// Returns the remaining allowance granted by `owner` to `spender`.
    #[must_use]
    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Iterates over every account with a gross balance or a held amount.
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.balances
            .keys()
            .chain(self.held.keys())
            .map(String::as_str)
    }

    /// Creates new units on an account, growing the total supply.
    ///
    /// Minting never touches held amounts.
    pub fn mint(&mut self, account: &str, amount: u64) {
        let balance = self.balances.entry(account.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
        self.total_supply = self.total_supply.saturating_add(amount);
    }

    /// Destroys units from an account's available balance.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InsufficientAvailableBalance`] if the burn
    /// would dip into held funds.
    pub fn burn(&mut self, account: &str, amount: u64) -> Result<(), ValidationError> {
        let available = self.available_of(account);
        if amount > available {
            return Err(ValidationError::InsufficientAvailableBalance {
                account: account.to_string(),
                requested: amount,
                available,
            });
        }
        *self.balances.entry(account.to_string()).or_insert(0) -= amount;
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }

    /// Sets the allowance granted by `owner` to `spender`.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u64) {
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
    }

    /// Moves `amount` from `from` to `to`, gated on the available balance.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InsufficientAvailableBalance`] if `amount`
    /// exceeds `available_of(from)`.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), ValidationError> {
        let available = self.available_of(from);
        if amount > available {
            return Err(ValidationError::InsufficientAvailableBalance {
                account: from.to_string(),
                requested: amount,
                available,
            });
        }
        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// the spender's allowance.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InsufficientAvailableBalance`] if `amount`
    /// exceeds the available balance, or
    /// [`ValidationError::InsufficientAllowance`] if it exceeds the
    /// remaining allowance.
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<(), ValidationError> {
        let available = self.available_of(from);
        if amount > available {
            return Err(ValidationError::InsufficientAvailableBalance {
                account: from.to_string(),
                requested: amount,
                available,
            });
        }
        let allowance = self.allowance(from, spender);
        if amount > allowance {
            return Err(ValidationError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                requested: amount,
                allowance,
            });
        }
        self.allowances
            .entry(from.to_string())
            .or_default()
            .insert(spender.to_string(), allowance - amount);
        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }

    /// Locks `amount` of the payer's balance under holds.
    ///
    /// The caller must have verified `amount <= available_of(account)`.
    pub(crate) fn add_held(&mut self, account: &str, amount: u64) {
        debug_assert!(amount <= self.available_of(account));
        *self.held.entry(account.to_string()).or_insert(0) += amount;
        self.total_on_hold = self.total_on_hold.saturating_add(amount);
    }

    /// Unlocks `amount` of the payer's held balance.
    ///
    /// The caller must have verified `amount <= held_of(account)`.
    pub(crate) fn release_held(&mut self, account: &str, amount: u64) {
        debug_assert!(amount <= self.held_of(account));
        *self.held.entry(account.to_string()).or_insert(0) -= amount;
        self.total_on_hold = self.total_on_hold.saturating_sub(amount);
    }

    /// Settles an execution: unlocks `released` from the payer's held
    /// balance and moves `transferred` of it to the payee.
    ///
    /// The caller must have verified `transferred <= released <=
    /// held_of(payer)`; under that precondition the transfer cannot fail.
    pub(crate) fn settle_hold(
        &mut self,
        payer: &str,
        payee: &str,
        released: u64,
        transferred: u64,
    ) {
        debug_assert!(transferred <= released);
        self.release_held(payer, released);
        *self.balances.entry(payer.to_string()).or_insert(0) -= transferred;
        *self.balances.entry(payee.to_string()).or_insert(0) += transferred;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_grows_balance_and_supply() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.mint("bob", 2);

        assert_eq!(book.total_of("alice"), 3);
        assert_eq!(book.available_of("alice"), 3);
        assert_eq!(book.held_of("alice"), 0);
        assert_eq!(book.total_supply(), 5);
    }

    #[test]
    fn held_amount_reduces_available_not_total() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.add_held("alice", 2);

        assert_eq!(book.total_of("alice"), 3);
        assert_eq!(book.available_of("alice"), 1);
        assert_eq!(book.held_of("alice"), 2);
        assert_eq!(book.total_on_hold(), 2);
    }

    #[test]
    fn transfer_is_gated_on_available_balance() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.add_held("alice", 1);

        assert_eq!(
            book.transfer("alice", "bob", 3),
            Err(ValidationError::InsufficientAvailableBalance {
                account: "alice".to_string(),
                requested: 3,
                available: 2,
            })
        );

        book.transfer("alice", "bob", 2).unwrap();
        assert_eq!(book.total_of("alice"), 1);
        assert_eq!(book.total_of("bob"), 2);
        assert_eq!(book.total_supply(), 3);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.approve("alice", "carol", 3);

        book.transfer_from("carol", "alice", "bob", 2).unwrap();
        assert_eq!(book.allowance("alice", "carol"), 1);
        assert_eq!(book.total_of("bob"), 2);

        assert_eq!(
            book.transfer_from("carol", "alice", "bob", 2),
            Err(ValidationError::InsufficientAllowance {
                owner: "alice".to_string(),
                spender: "carol".to_string(),
                requested: 2,
                allowance: 1,
            })
        );
    }

    #[test]
    fn transfer_from_checks_available_before_allowance() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.add_held("alice", 1);
        book.approve("alice", "carol", 3);

        assert_eq!(
            book.transfer_from("carol", "alice", "bob", 3),
            Err(ValidationError::InsufficientAvailableBalance {
                account: "alice".to_string(),
                requested: 3,
                available: 2,
            })
        );
        // A failed transfer consumes no allowance.
        assert_eq!(book.allowance("alice", "carol"), 3);
    }

    #[test]
    fn burn_cannot_dip_into_held_funds() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.add_held("alice", 2);

        assert!(book.burn("alice", 2).is_err());
        book.burn("alice", 1).unwrap();
        assert_eq!(book.total_of("alice"), 2);
        assert_eq!(book.total_supply(), 2);
    }

    #[test]
    fn release_restores_available_balance() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.add_held("alice", 3);
        book.release_held("alice", 3);

        assert_eq!(book.available_of("alice"), 3);
        assert_eq!(book.total_on_hold(), 0);
    }

    #[test]
    fn settle_hold_moves_transferred_and_frees_remainder() {
        let mut book = BalanceBook::new();
        book.mint("alice", 3);
        book.add_held("alice", 3);

        // Close with a partial transfer: 1 moves to bob, 2 become available.
        book.settle_hold("alice", "bob", 3, 1);

        assert_eq!(book.total_of("alice"), 2);
        assert_eq!(book.available_of("alice"), 2);
        assert_eq!(book.total_of("bob"), 1);
        assert_eq!(book.held_of("alice"), 0);
        assert_eq!(book.total_supply(), 3);
    }
}
