//! Hold records, their status machine, and the operation-id registry.
//!
//! A [`Hold`] earmarks part of a payer's balance for a payee, resolvable by
//! a notary or by expiration. Holds are identified by a caller-supplied
//! operation id that is consumed permanently on first use.
//!
//! # State Machine
//!
//! ```text
//! (create) --> Ordered --execute_hold----------------> Executed
//!                |  ^                                      ^
//!                |  |                                      |
//!                |  +--renew (new expiration)              |
//!                |                                         |
//!                +--execute_hold_and_keep_open--> ExecutedAndKeptOpen
//!                |                                  |    (self-loop)
//!                +--release--+----------------------+
//!                            v
//!              ReleasedByNotary / ReleasedByPayee / ReleasedByExpiration
//! ```
//!
//! `Ordered` is the initial status. `Executed` and the three released
//! statuses are terminal; a terminal hold is never deleted and stays
//! queryable as history, but every further transition on it fails.

mod error;
mod registry;
mod state;

#[cfg(test)]
mod tests;

pub use error::{AuthorizationError, HoldError, StateError, ValidationError};
pub use registry::HoldRegistry;
pub use state::{Expiration, Hold, HoldStatus};
