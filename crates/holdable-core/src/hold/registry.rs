//! Append-only registry of holds keyed by operation id.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::state::Hold;

/// Append-only map from operation id to [`Hold`], plus a never-pruned set of
/// every id ever accepted.
///
/// Terminal holds are kept forever as queryable history. The separate
/// `used_ids` set keeps uniqueness checks O(1) and guarantees an id can never
/// come back into circulation, whatever happens to the hold itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HoldRegistry {
    /// All holds ever created, keyed by operation id.
    holds: HashMap<String, Hold>,
    /// Every operation id ever consumed.
    used_ids: HashSet<String>,
}

impl HoldRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the operation id has ever been consumed.
    #[must_use]
    pub fn is_used(&self, operation_id: &str) -> bool {
        self.used_ids.contains(operation_id)
    }

    /// Returns the hold for an operation id, if one was ever created.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&Hold> {
        self.holds.get(operation_id)
    }

    /// Returns a mutable reference to the hold for an operation id.
    pub(crate) fn get_mut(&mut self, operation_id: &str) -> Option<&mut Hold> {
        self.holds.get_mut(operation_id)
    }

    /// Registers a new hold, consuming its operation id permanently.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyOperationId`] for an empty id and
    /// [`ValidationError::DuplicateOperationId`] for an id that was ever
    /// used before, even by a hold that has since terminated.
    pub fn insert(&mut self, operation_id: &str, hold: Hold) -> Result<(), ValidationError> {
        if operation_id.is_empty() {
            return Err(ValidationError::EmptyOperationId);
        }
        if self.is_used(operation_id) {
            return Err(ValidationError::DuplicateOperationId {
                operation_id: operation_id.to_string(),
            });
        }
        self.used_ids.insert(operation_id.to_string());
        self.holds.insert(operation_id.to_string(), hold);
        Ok(())
    }

    /// Returns the number of holds ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.holds.len()
    }

    /// Returns `true` if no hold was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    /// Returns the number of holds still locking value.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.holds.values().filter(|h| h.status.is_active()).count()
    }

    /// Iterates over all holds with their operation ids.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Hold)> {
        self.holds.iter().map(|(id, hold)| (id.as_str(), hold))
    }

    /// Sums the remaining value of all active holds with the given payer.
    #[must_use]
    pub fn active_value_for_payer(&self, payer: &str) -> u64 {
        self.holds
            .values()
            .filter(|h| h.payer == payer && h.status.is_active())
            .map(|h| h.value)
            .sum()
    }
}
