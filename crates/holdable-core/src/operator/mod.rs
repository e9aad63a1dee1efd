//! Operator authorization: who may create holds on whose behalf.
//!
//! Two layers combine here:
//!
//! - [`OperatorRegistry`]: per-account sets of explicitly authorized
//!   operators, mutated by `authorize`/`revoke`
//! - [`DefaultOperatorLookup`]: a read-only view of the process-wide
//!   default-operator set, administered outside the core and injected at
//!   engine construction
//!
//! An operator acts for an account when either layer says so.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::hold::AuthorizationError;

/// Read-only view of the externally administered default-operator set.
///
/// Default operators act as implicit operators for every account. The core
/// only consults membership; adding and removing default operators is an
/// administrative concern outside this crate.
pub trait DefaultOperatorLookup: Send + Sync {
    /// Returns `true` if the operator is a process-wide default operator.
    fn is_default_operator(&self, operator: &str) -> bool;
}

/// The empty default-operator set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaultOperators;

impl DefaultOperatorLookup for NoDefaultOperators {
    fn is_default_operator(&self, _operator: &str) -> bool {
        false
    }
}

impl DefaultOperatorLookup for HashSet<String> {
    fn is_default_operator(&self, operator: &str) -> bool {
        self.contains(operator)
    }
}

/// Per-account sets of explicitly authorized hold operators.
///
/// Sets are created lazily on first authorization and never deleted
/// wholesale; revocation removes single entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatorRegistry {
    authorized: HashMap<String, HashSet<String>>,
}

impl OperatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `operator` as explicitly authorized for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::AlreadyAuthorized`] if the operator is
    /// already explicitly authorized for the account.
    pub fn authorize(&mut self, account: &str, operator: &str) -> Result<(), AuthorizationError> {
        let operators = self.authorized.entry(account.to_string()).or_default();
        if !operators.insert(operator.to_string()) {
            return Err(AuthorizationError::AlreadyAuthorized {
                operator: operator.to_string(),
                account: account.to_string(),
            });
        }
        Ok(())
    }

    /// Removes `operator`'s explicit authorization for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::NotAuthorized`] if no explicit
    /// authorization exists.
    pub fn revoke(&mut self, account: &str, operator: &str) -> Result<(), AuthorizationError> {
        let removed = self
            .authorized
            .get_mut(account)
            .is_some_and(|operators| operators.remove(operator));
        if !removed {
            return Err(AuthorizationError::NotAuthorized {
                operator: operator.to_string(),
                account: account.to_string(),
            });
        }
        Ok(())
    }

    /// Returns `true` if `operator` is explicitly authorized for `account`.
    ///
    /// Default operators are not considered here; combine with a
    /// [`DefaultOperatorLookup`] for the full check.
    #[must_use]
    pub fn is_explicitly_authorized(&self, operator: &str, account: &str) -> bool {
        self.authorized
            .get(account)
            .is_some_and(|operators| operators.contains(operator))
    }
}
