//! Error taxonomy for hold operations.
//!
//! Three families: [`ValidationError`] for malformed or unaffordable
//! requests, [`AuthorizationError`] for callers acting outside their role,
//! and [`StateError`] for transitions the hold's current status forbids.
//! [`HoldError`] is the umbrella returned by the engine. None of these are
//! retryable as-is; the caller must correct the triggering condition first.

use thiserror::Error;

/// A request was malformed or cannot be funded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The operation id was empty.
    #[error("operation id must not be empty")]
    EmptyOperationId,

    /// The operation id has already been used, possibly by a hold that has
    /// since terminated. Ids are never reusable.
    #[error("operation id already exists: {operation_id}")]
    DuplicateOperationId {
        /// The already-consumed operation id.
        operation_id: String,
    },

    /// The requested value was zero.
    #[error("value must be greater than zero")]
    ZeroValue,

    /// A required account was the zero (empty) account.
    #[error("{field} must not be the zero account")]
    ZeroAddress {
        /// Which account field was invalid.
        field: &'static str,
    },

    /// An explicit expiration was not strictly in the future.
    #[error("expiration must lie strictly in the future: provided={provided}, now={now}")]
    InvalidExpiration {
        /// The rejected instant, in seconds since the Unix epoch.
        provided: u64,
        /// The clock reading at validation time.
        now: u64,
    },

    /// The payer's available balance cannot cover the request.
    #[error(
        "not enough available balance on {account}: requested={requested}, available={available}"
    )]
    InsufficientAvailableBalance {
        /// The account short on available balance.
        account: String,
        /// The requested amount.
        requested: u64,
        /// The available balance at validation time.
        available: u64,
    },

    /// A delegated transfer exceeds the spender's allowance.
    #[error(
        "allowance from {owner} to {spender} cannot cover the request: \
         requested={requested}, allowance={allowance}"
    )]
    InsufficientAllowance {
        /// The account that granted the allowance.
        owner: String,
        /// The spender whose allowance is short.
        spender: String,
        /// The requested amount.
        requested: u64,
        /// The granted allowance at validation time.
        allowance: u64,
    },

    /// An execution requested more than the hold's remaining value.
    #[error("value exceeds the held amount: requested={requested}, held={held}")]
    ExceedsHeldValue {
        /// The requested amount.
        requested: u64,
        /// The hold's remaining value.
        held: u64,
    },
}

/// The caller is not entitled to the attempted operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthorizationError {
    /// The caller is not an operator for the payer.
    #[error("{operator} is not an authorized hold operator for {payer}")]
    UnauthorizedOperator {
        /// The rejected caller.
        operator: String,
        /// The payer the caller tried to act for.
        payer: String,
    },

    /// A not-expired hold can only be released by the notary or the payee.
    #[error("a not-expired hold can only be released by the notary or the payee, not {caller}")]
    UnauthorizedReleaser {
        /// The rejected caller.
        caller: String,
        /// The hold's operation id.
        operation_id: String,
    },

    /// A hold can only be executed by its notary.
    #[error("hold {operation_id} can only be executed by the notary, not {caller}")]
    UnauthorizedExecutor {
        /// The rejected caller.
        caller: String,
        /// The hold's operation id.
        operation_id: String,
    },

    /// A hold can only be renewed by its issuer or its payer.
    #[error("hold {operation_id} can only be renewed by the issuer or the payer, not {caller}")]
    UnauthorizedRenewer {
        /// The rejected caller.
        caller: String,
        /// The hold's operation id.
        operation_id: String,
    },

    /// The operator is already explicitly authorized for the account.
    #[error("{operator} is already an authorized hold operator for {account}")]
    AlreadyAuthorized {
        /// The operator that was already authorized.
        operator: String,
        /// The authorizing account.
        account: String,
    },

    /// The operator has no explicit authorization to revoke.
    #[error("{operator} is not an authorized hold operator for {account}")]
    NotAuthorized {
        /// The operator that was not authorized.
        operator: String,
        /// The account attempting the revocation.
        account: String,
    },
}

/// The hold's current status forbids the attempted transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StateError {
    /// The transition requires an active hold. Unknown operation ids report
    /// status `nonexistent`.
    #[error("hold {operation_id} is not in an executable status: {status}")]
    NotOrdered {
        /// The operation id.
        operation_id: String,
        /// The hold's current status, or `nonexistent`.
        status: &'static str,
    },

    /// The hold has already expired; it can only be released now.
    #[error("hold {operation_id} already expired at {expired_at}")]
    AlreadyExpired {
        /// The operation id.
        operation_id: String,
        /// The expiration instant, in seconds since the Unix epoch.
        expired_at: u64,
    },
}

/// Umbrella error returned by every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HoldError {
    /// The request was malformed or cannot be funded.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The caller is not entitled to the operation.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The hold's status forbids the transition.
    #[error(transparent)]
    State(#[from] StateError),
}
