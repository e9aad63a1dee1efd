//! The hold engine: single serializing aggregate over balances, holds, and
//! operator authorization.
//!
//! [`HoldEngine`] owns the whole mutable state triple ([`BalanceBook`],
//! [`HoldRegistry`], [`OperatorRegistry`]) and is the only component allowed
//! to mutate it. Every operation follows the same discipline:
//!
//! 1. read the clock (the only external read, non-blocking)
//! 2. validate the full request against a consistent snapshot
//! 3. commit all mutations, then return the outcome record
//!
//! A failed operation returns before step 3 and leaves the aggregate
//! untouched. There is no rollback machinery because nothing is ever
//! partially written.
//!
//! # Concurrency
//!
//! The engine itself is a plain `&mut self` state machine: exclusive access
//! serializes writers by construction. [`SharedHoldEngine`] wraps it in an
//! `Arc<RwLock<_>>` so read-only queries can run concurrently against a
//! consistent snapshot while writers take the exclusive lock.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::clock::Clock;
use crate::events::{
    AuthorizedHoldOperator, HoldCreated, HoldExecuted, HoldExecutedAndKeptOpen, HoldReleased,
    HoldRenewed, RevokedHoldOperator, Transfer,
};
use crate::hold::{
    AuthorizationError, Expiration, Hold, HoldError, HoldRegistry, HoldStatus, StateError,
    ValidationError,
};
use crate::ledger::BalanceBook;
use crate::operator::{DefaultOperatorLookup, NoDefaultOperators, OperatorRegistry};


/// Validates and executes every hold, transfer, and operator operation.
pub struct HoldEngine {
    book: BalanceBook,
    registry: HoldRegistry,
    operators: OperatorRegistry,
    default_operators: Arc<dyn DefaultOperatorLookup>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HoldEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldEngine")
            .field("book", &self.book)
            .field("registry", &self.registry)
            .field("operators", &self.operators)
            .finish_non_exhaustive()
    }
}

impl HoldEngine {
    /// Creates an engine with no default operators.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_default_operators(clock, Arc::new(NoDefaultOperators))
    }

    /// Creates an engine consulting the given default-operator set.
    ///
    /// The set is administered externally; the engine only reads it.
    #[must_use]
    pub fn with_default_operators(
        clock: Arc<dyn Clock>,
        default_operators: Arc<dyn DefaultOperatorLookup>,
    ) -> Self {
        Self {
            book: BalanceBook::new(),
            registry: HoldRegistry::new(),
            operators: OperatorRegistry::new(),
            default_operators,
            clock,
        }
    }

    /// Read access to the balance book.
    #[must_use]
    pub const fn book(&self) -> &BalanceBook {
        &self.book
    }

    /// Read access to the hold registry.
    #[must_use]
    pub const fn registry(&self) -> &HoldRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Balance queries
    // ------------------------------------------------------------------

    /// Returns the spendable balance: net minus held.
    #[must_use]
    pub fn balance_of(&self, account: &str) -> u64 {
        self.book.available_of(account)
    }

    /// Returns the amount the account currently has locked in active holds.
    #[must_use]
    pub fn balance_on_hold(&self, account: &str) -> u64 {
        self.book.held_of(account)
    }

    /// Returns the gross balance: available plus held.
    #[must_use]
    pub fn net_balance_of(&self, account: &str) -> u64 {
        self.book.total_of(account)
    }

    /// Returns the sum of all gross balances.
    #[must_use]
    pub fn total_supply(&self) -> u64 {
        self.book.total_supply()
    }

    /// Returns the sum of held amounts across all accounts.
    #[must_use]
    pub fn total_supply_on_hold(&self) -> u64 {
        self.book.total_on_hold()
    }

    /// Returns the remaining allowance granted by `owner` to `spender`.
    #[must_use]
    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.book.allowance(owner, spender)
    }

    /// Returns the hold for an operation id, terminal holds included.
    #[must_use]
    pub fn retrieve_hold(&self, operation_id: &str) -> Option<&Hold> {
        self.registry.get(operation_id)
    }

    /// Returns `true` if `operator` may manage holds for `account`, either
    /// through explicit authorization or as a default operator.
    #[must_use]
    pub fn is_hold_operator_for(&self, operator: &str, account: &str) -> bool {
        self.operators.is_explicitly_authorized(operator, account)
            || self.default_operators.is_default_operator(operator)
    }

    // ------------------------------------------------------------------
    // Collaborator operations (base ledger)
    // ------------------------------------------------------------------

    /// Mints new units onto an account.
    pub fn mint(&mut self, account: &str, amount: u64) -> Result<Transfer, HoldError> {
        if account.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "account" }.into());
        }
        self.book.mint(account, amount);
        Ok(Transfer {
            from: String::new(),
            to: account.to_string(),
            value: amount,
        })
    }

    /// Burns units from an account's available balance. Held funds cannot
    /// be burned.
    pub fn burn(&mut self, account: &str, amount: u64) -> Result<Transfer, HoldError> {
        if account.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "account" }.into());
        }
        self.book.burn(account, amount)?;
        Ok(Transfer {
            from: account.to_string(),
            to: String::new(),
            value: amount,
        })
    }

    /// Sets the allowance granted by the caller to `spender`.
    pub fn approve(&mut self, caller: &str, spender: &str, amount: u64) -> Result<(), HoldError> {
        if spender.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "spender" }.into());
        }
        self.book.approve(caller, spender, amount);
        Ok(())
    }

    /// Transfers from the caller's available balance.
    pub fn transfer(&mut self, caller: &str, to: &str, amount: u64) -> Result<Transfer, HoldError> {
        if to.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "to" }.into());
        }
        self.book.transfer(caller, to, amount)?;
        debug!(from = caller, to, amount, "transfer");
        Ok(Transfer {
            from: caller.to_string(),
            to: to.to_string(),
            value: amount,
        })
    }

    /// Transfers from `from`'s available balance on behalf of the caller,
    /// consuming the caller's allowance.
    pub fn transfer_from(
        &mut self,
        caller: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<Transfer, HoldError> {
        if to.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "to" }.into());
        }
        self.book.transfer_from(caller, from, to, amount)?;
        debug!(spender = caller, from, to, amount, "delegated transfer");
        Ok(Transfer {
            from: from.to_string(),
            to: to.to_string(),
            value: amount,
        })
    }

    // ------------------------------------------------------------------
    // Operator authorization
    // ------------------------------------------------------------------

    /// Authorizes `operator` to manage holds on the caller's behalf.
    pub fn authorize_hold_operator(
        &mut self,
        caller: &str,
        operator: &str,
    ) -> Result<AuthorizedHoldOperator, HoldError> {
        if operator.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "operator" }.into());
        }
        self.operators.authorize(caller, operator)?;
        debug!(account = caller, operator, "hold operator authorized");
        Ok(AuthorizedHoldOperator {
            operator: operator.to_string(),
            account: caller.to_string(),
        })
    }

    /// Revokes `operator`'s explicit authorization for the caller.
    pub fn revoke_hold_operator(
        &mut self,
        caller: &str,
        operator: &str,
    ) -> Result<RevokedHoldOperator, HoldError> {
        if operator.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "operator" }.into());
        }
        self.operators.revoke(caller, operator)?;
        debug!(account = caller, operator, "hold operator revoked");
        Ok(RevokedHoldOperator {
            operator: operator.to_string(),
            account: caller.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Hold creation
    // ------------------------------------------------------------------

    /// Creates a hold on the caller's own balance.
    ///
    /// `duration` is relative: 0 means the hold never expires, anything
    /// else expires `duration` seconds from now.
    pub fn hold(
        &mut self,
        caller: &str,
        operation_id: &str,
        payee: &str,
        notary: &str,
        value: u64,
        duration: u64,
    ) -> Result<HoldCreated, HoldError> {
        let expiration = Expiration::from_duration(self.clock.now(), duration);
        self.create_hold(caller, caller, operation_id, payee, notary, value, expiration)
    }

    /// Creates a hold on the caller's own balance with an absolute
    /// expiration, which must be [`Expiration::Never`] or strictly in the
    /// future.
    pub fn hold_with_expiration(
        &mut self,
        caller: &str,
        operation_id: &str,
        payee: &str,
        notary: &str,
        value: u64,
        expiration: Expiration,
    ) -> Result<HoldCreated, HoldError> {
        self.create_hold(caller, caller, operation_id, payee, notary, value, expiration)
    }

    /// Creates a hold on `payer`'s balance; the caller must be an operator
    /// for the payer.
    #[allow(clippy::too_many_arguments)]
    pub fn hold_from(
        &mut self,
        caller: &str,
        operation_id: &str,
        payer: &str,
        payee: &str,
        notary: &str,
        value: u64,
        duration: u64,
    ) -> Result<HoldCreated, HoldError> {
        self.check_operator(caller, payer)?;
        let expiration = Expiration::from_duration(self.clock.now(), duration);
        self.create_hold(caller, payer, operation_id, payee, notary, value, expiration)
    }

    /// Creates a hold on `payer`'s balance with an absolute expiration; the
    /// caller must be an operator for the payer.
    #[allow(clippy::too_many_arguments)]
    pub fn hold_from_with_expiration(
        &mut self,
        caller: &str,
        operation_id: &str,
        payer: &str,
        payee: &str,
        notary: &str,
        value: u64,
        expiration: Expiration,
    ) -> Result<HoldCreated, HoldError> {
        self.check_operator(caller, payer)?;
        self.create_hold(caller, payer, operation_id, payee, notary, value, expiration)
    }

    fn check_operator(&self, caller: &str, payer: &str) -> Result<(), HoldError> {
        if payer.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "payer" }.into());
        }
        if !self.is_hold_operator_for(caller, payer) {
            return Err(AuthorizationError::UnauthorizedOperator {
                operator: caller.to_string(),
                payer: payer.to_string(),
            }
            .into());
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn create_hold(
        &mut self,
        issuer: &str,
        payer: &str,
        operation_id: &str,
        payee: &str,
        notary: &str,
        value: u64,
        expiration: Expiration,
    ) -> Result<HoldCreated, HoldError> {
        if operation_id.is_empty() {
            return Err(ValidationError::EmptyOperationId.into());
        }
        if self.registry.is_used(operation_id) {
            return Err(ValidationError::DuplicateOperationId {
                operation_id: operation_id.to_string(),
            }
            .into());
        }
        if value == 0 {
            return Err(ValidationError::ZeroValue.into());
        }
        if payee.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "payee" }.into());
        }
        if notary.is_empty() {
            return Err(ValidationError::ZeroAddress { field: "notary" }.into());
        }
        let now = self.clock.now();
        if let Expiration::At(at) = expiration {
            if at <= now {
                return Err(ValidationError::InvalidExpiration { provided: at, now }.into());
            }
        }
        let available = self.book.available_of(payer);
        if value > available {
            return Err(ValidationError::InsufficientAvailableBalance {
                account: payer.to_string(),
                requested: value,
                available,
            }
            .into());
        }

        let hold = Hold::new(issuer, payer, payee, notary, value, expiration);
        self.registry.insert(operation_id, hold)?;
        self.book.add_held(payer, value);
        debug!(operation_id, issuer, payer, payee, notary, value, "hold created");

        Ok(HoldCreated {
            issuer: issuer.to_string(),
            operation_id: operation_id.to_string(),
            payer: payer.to_string(),
            payee: payee.to_string(),
            notary: notary.to_string(),
            value,
            expiration,
        })
    }

    // ------------------------------------------------------------------
    // Hold resolution
    // ------------------------------------------------------------------

    /// Looks up a hold that still accepts transitions. Missing ids report
    /// status `nonexistent`; terminal holds report their terminal status.
    fn active_hold(&self, operation_id: &str) -> Result<&Hold, StateError> {
        match self.registry.get(operation_id) {
            None => Err(StateError::NotOrdered {
                operation_id: operation_id.to_string(),
                status: "nonexistent",
            }),
            Some(hold) if hold.status.is_terminal() => Err(StateError::NotOrdered {
                operation_id: operation_id.to_string(),
                status: hold.status.as_str(),
            }),
            Some(hold) => Ok(hold),
        }
    }

    /// Releases a hold, returning its remaining value to the payer.
    ///
    /// The notary and the payee may release at any time; once the hold has
    /// expired, anyone may. The hold's `value` is kept for audit.
    pub fn release_hold(
        &mut self,
        caller: &str,
        operation_id: &str,
    ) -> Result<HoldReleased, HoldError> {
        let now = self.clock.now();
        let hold = self.active_hold(operation_id)?;

        let status = if caller == hold.notary {
            HoldStatus::ReleasedByNotary
        } else if caller == hold.payee {
            HoldStatus::ReleasedByPayee
        } else if hold.is_expired_at(now) {
            HoldStatus::ReleasedByExpiration
        } else {
            return Err(AuthorizationError::UnauthorizedReleaser {
                caller: caller.to_string(),
                operation_id: operation_id.to_string(),
            }
            .into());
        };

        let (issuer, payer, value) = (hold.issuer.clone(), hold.payer.clone(), hold.value);
        self.book.release_held(&payer, value);
        // The id was just looked up; the registry never deletes.
        if let Some(hold) = self.registry.get_mut(operation_id) {
            hold.status = status;
        }
        debug!(
            operation_id,
            payer = payer.as_str(),
            value,
            status = status.as_str(),
            "hold released"
        );

        Ok(HoldReleased {
            issuer,
            operation_id: operation_id.to_string(),
            status,
        })
    }

    /// Executes a hold and closes it: transfers `value` to the payee and
    /// returns the untransferred remainder to the payer.
    pub fn execute_hold(
        &mut self,
        caller: &str,
        operation_id: &str,
        value: u64,
    ) -> Result<HoldExecuted, HoldError> {
        let outcome = self.execute(caller, operation_id, value, false)?;
        Ok(HoldExecuted {
            issuer: outcome.issuer,
            operation_id: operation_id.to_string(),
            notary: outcome.notary,
            held_value: outcome.held_value,
            transferred_value: value,
        })
    }

    /// Executes part of a hold and keeps it open: transfers `value` to the
    /// payee and leaves the rest locked.
    ///
    /// A hold drained to zero remaining value stays open; it can still be
    /// released, but any further execution fails for lack of held value.
    pub fn execute_hold_and_keep_open(
        &mut self,
        caller: &str,
        operation_id: &str,
        value: u64,
    ) -> Result<HoldExecutedAndKeptOpen, HoldError> {
        let outcome = self.execute(caller, operation_id, value, true)?;
        Ok(HoldExecutedAndKeptOpen {
            issuer: outcome.issuer,
            operation_id: operation_id.to_string(),
            notary: outcome.notary,
            held_value: outcome.held_value,
            transferred_value: value,
        })
    }

    fn execute(
        &mut self,
        caller: &str,
        operation_id: &str,
        value: u64,
        keep_open: bool,
    ) -> Result<ExecuteOutcome, HoldError> {
        let now = self.clock.now();
        let hold = self.active_hold(operation_id)?;

        if caller != hold.notary {
            return Err(AuthorizationError::UnauthorizedExecutor {
                caller: caller.to_string(),
                operation_id: operation_id.to_string(),
            }
            .into());
        }
        if hold.is_expired_at(now) {
            return Err(StateError::AlreadyExpired {
                operation_id: operation_id.to_string(),
                expired_at: hold.expiration.as_secs(),
            }
            .into());
        }
        if value == 0 {
            return Err(ValidationError::ZeroValue.into());
        }
        if value > hold.value {
            return Err(ValidationError::ExceedsHeldValue {
                requested: value,
                held: hold.value,
            }
            .into());
        }

        let outcome = ExecuteOutcome {
            issuer: hold.issuer.clone(),
            notary: hold.notary.clone(),
            held_value: hold.value,
        };
        let payer = hold.payer.clone();
        let payee = hold.payee.clone();

        // Closing frees the whole remaining value; keeping open frees only
        // what was transferred.
        let released = if keep_open { value } else { outcome.held_value };
        self.book.settle_hold(&payer, &payee, released, value);
        if let Some(hold) = self.registry.get_mut(operation_id) {
            if keep_open {
                hold.value -= value;
                hold.status = HoldStatus::ExecutedAndKeptOpen;
            } else {
                hold.status = HoldStatus::Executed;
            }
        }
        debug!(
            operation_id,
            payer = payer.as_str(),
            payee = payee.as_str(),
            value,
            keep_open,
            "hold executed"
        );

        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Hold renewal
    // ------------------------------------------------------------------

    /// Renews a hold with a relative duration: 0 makes it perpetual,
    /// anything else expires `duration` seconds from now.
    pub fn renew_hold(
        &mut self,
        caller: &str,
        operation_id: &str,
        duration: u64,
    ) -> Result<HoldRenewed, HoldError> {
        let expiration = Expiration::from_duration(self.clock.now(), duration);
        self.renew(caller, operation_id, expiration, false)
    }

    /// Renews a hold with an absolute expiration, which must be
    /// [`Expiration::Never`] or strictly in the future.
    pub fn renew_hold_with_expiration(
        &mut self,
        caller: &str,
        operation_id: &str,
        expiration: Expiration,
    ) -> Result<HoldRenewed, HoldError> {
        self.renew(caller, operation_id, expiration, true)
    }

    fn renew(
        &mut self,
        caller: &str,
        operation_id: &str,
        expiration: Expiration,
        explicit: bool,
    ) -> Result<HoldRenewed, HoldError> {
        let now = self.clock.now();
        let hold = self.active_hold(operation_id)?;

        // Renewal is stricter than release: a partially executed hold can
        // no longer be renewed.
        if hold.status != HoldStatus::Ordered {
            return Err(StateError::NotOrdered {
                operation_id: operation_id.to_string(),
                status: hold.status.as_str(),
            }
            .into());
        }
        if hold.is_expired_at(now) {
            return Err(StateError::AlreadyExpired {
                operation_id: operation_id.to_string(),
                expired_at: hold.expiration.as_secs(),
            }
            .into());
        }
        if caller != hold.issuer && caller != hold.payer {
            return Err(AuthorizationError::UnauthorizedRenewer {
                caller: caller.to_string(),
                operation_id: operation_id.to_string(),
            }
            .into());
        }
        if explicit {
            if let Expiration::At(at) = expiration {
                if at <= now {
                    return Err(ValidationError::InvalidExpiration { provided: at, now }.into());
                }
            }
        }

        let (issuer, old_expiration) = (hold.issuer.clone(), hold.expiration);
        if let Some(hold) = self.registry.get_mut(operation_id) {
            hold.expiration = expiration;
        }
        debug!(
            operation_id,
            old = old_expiration.as_secs(),
            new = expiration.as_secs(),
            "hold renewed"
        );

        Ok(HoldRenewed {
            issuer,
            operation_id: operation_id.to_string(),
            old_expiration,
            new_expiration: expiration,
        })
    }
}

struct ExecuteOutcome {
    issuer: String,
    notary: String,
    held_value: u64,
}

/// Shared handle to a [`HoldEngine`]: concurrent readers, one writer.
///
/// All mutating operations must go through [`write`]; the exclusive lock
/// preserves the single-writer validate-then-commit semantics. Readers
/// taken through [`read`] observe a consistent snapshot.
///
/// [`read`]: SharedHoldEngine::read
/// [`write`]: SharedHoldEngine::write
#[derive(Debug, Clone)]
pub struct SharedHoldEngine {
    inner: Arc<RwLock<HoldEngine>>,
}

impl SharedHoldEngine {
    /// Wraps an engine for shared use.
    #[must_use]
    pub fn new(engine: HoldEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Takes a shared read lock for queries.
    ///
    /// The engine's invariants hold after every committed operation, so a
    /// poisoned lock still guards a consistent snapshot and is recovered.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, HoldEngine> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the exclusive write lock for mutating operations.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, HoldEngine> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
