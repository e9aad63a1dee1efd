//! Structured outcome records returned by every mutating operation.
//!
//! These are the in-process equivalent of emitted events: each successful
//! mutator hands one back so callers can observe exactly what was committed
//! without re-querying the aggregate. Delivery to any external sink is out
//! of scope for this crate.

use serde::{Deserialize, Serialize};

use crate::hold::{Expiration, HoldStatus};

/// A hold was created and its value locked on the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldCreated {
    /// Account that initiated the hold (payer or operator).
    pub issuer: String,
    /// The hold's operation id.
    pub operation_id: String,
    /// Account whose balance was earmarked.
    pub payer: String,
    /// Account entitled to the held value.
    pub payee: String,
    /// Third party that can execute or release the hold.
    pub notary: String,
    /// Earmarked value.
    pub value: u64,
    /// When the hold becomes releasable by anyone.
    pub expiration: Expiration,
}

/// A hold was released; its remaining value returned to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldReleased {
    /// Account that initiated the hold.
    pub issuer: String,
    /// The hold's operation id.
    pub operation_id: String,
    /// Which terminal released status the hold reached.
    pub status: HoldStatus,
}

/// A hold was executed and closed by its notary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldExecuted {
    /// Account that initiated the hold.
    pub issuer: String,
    /// The hold's operation id.
    pub operation_id: String,
    /// The executing notary.
    pub notary: String,
    /// The hold's remaining value at call time.
    pub held_value: u64,
    /// The amount actually moved to the payee.
    pub transferred_value: u64,
}

/// A hold was partially executed and left open by its notary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldExecutedAndKeptOpen {
    /// Account that initiated the hold.
    pub issuer: String,
    /// The hold's operation id.
    pub operation_id: String,
    /// The executing notary.
    pub notary: String,
    /// The hold's remaining value at call time.
    pub held_value: u64,
    /// The amount moved to the payee.
    pub transferred_value: u64,
}

/// A hold's expiration was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRenewed {
    /// Account that initiated the hold.
    pub issuer: String,
    /// The hold's operation id.
    pub operation_id: String,
    /// Expiration before the renewal.
    pub old_expiration: Expiration,
    /// Expiration after the renewal.
    pub new_expiration: Expiration,
}

/// An operator was explicitly authorized for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedHoldOperator {
    /// The authorized operator.
    pub operator: String,
    /// The authorizing account.
    pub account: String,
}

/// An operator's explicit authorization was revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedHoldOperator {
    /// The revoked operator.
    pub operator: String,
    /// The revoking account.
    pub account: String,
}

/// Value moved between accounts (transfers, mints, burns).
///
/// Mints report an empty `from`; burns an empty `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Source account, or empty for a mint.
    pub from: String,
    /// Destination account, or empty for a burn.
    pub to: String,
    /// Amount moved.
    pub value: u64,
}
