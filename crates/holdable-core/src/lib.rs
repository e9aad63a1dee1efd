//! Conditional-transfer ("hold") extension over a fungible balance ledger.
//!
//! A payer earmarks part of their balance for a specific payee. The earmarked
//! amount stays on the payer's net balance but is no longer spendable; it can
//! only be moved to the payee by a designated notary (in full or partially),
//! or returned to the payer by the notary, the payee, or — once the hold has
//! expired — by anyone.
//!
//! # Components
//!
//! - **[`clock`]**: injectable time source ([`SystemClock`] in production,
//!   [`ManualClock`] in tests)
//! - **[`ledger`]**: [`BalanceBook`] — per-account total and held balances,
//!   supply counters, and the hold-gated transfer primitives
//! - **[`operator`]**: per-account operator authorization plus the
//!   externally administered default-operator set
//! - **[`hold`]**: the [`Hold`] record, its status machine, and the
//!   append-only [`HoldRegistry`] that makes operation ids single-use forever
//! - **[`engine`]**: [`HoldEngine`] — the single serializing aggregate that
//!   validates and commits every operation
//!
//! # Accounting Invariants
//!
//! For every account `a`, at all times:
//!
//! - `available(a) + held(a) == net(a)`
//! - `held(a)` equals the summed value of all holds with payer `a` in status
//!   `Ordered` or `ExecutedAndKeptOpen`
//! - `total_supply_on_hold()` equals the sum of `held(a)` over all accounts
//!
//! Every operation validates completely before mutating anything; a failed
//! operation leaves the aggregate untouched.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use holdable_core::{Expiration, HoldEngine, HoldStatus, ManualClock};
//!
//! let clock = Arc::new(ManualClock::new(1_000));
//! let mut engine = HoldEngine::new(clock);
//!
//! engine.mint("payer", 3).unwrap();
//!
//! // Earmark 1 unit for "payee", releasable by "notary", no expiration.
//! let created = engine.hold("payer", "op-1", "payee", "notary", 1, 0).unwrap();
//! assert_eq!(created.expiration, Expiration::Never);
//! assert_eq!(engine.balance_of("payer"), 2);
//! assert_eq!(engine.balance_on_hold("payer"), 1);
//!
//! // The notary releases the hold; the unit becomes spendable again.
//! let released = engine.release_hold("notary", "op-1").unwrap();
//! assert_eq!(released.status, HoldStatus::ReleasedByNotary);
//! assert_eq!(engine.balance_of("payer"), 3);
//! ```

pub mod clock;
pub mod engine;
pub mod events;
pub mod hold;
pub mod ledger;
pub mod operator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{HoldEngine, SharedHoldEngine};
pub use events::{
    AuthorizedHoldOperator, HoldCreated, HoldExecuted, HoldExecutedAndKeptOpen, HoldReleased,
    HoldRenewed, RevokedHoldOperator, Transfer,
};
pub use hold::{
    AuthorizationError, Expiration, Hold, HoldError, HoldRegistry, HoldStatus, StateError,
    ValidationError,
};
pub use ledger::BalanceBook;
pub use operator::{DefaultOperatorLookup, NoDefaultOperators, OperatorRegistry};
