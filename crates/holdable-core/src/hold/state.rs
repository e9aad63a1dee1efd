//! Hold record and status types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a hold.
///
/// The wire codes returned by [`code`](HoldStatus::code) are stable; code
/// 0 is reserved for the unconstructible "nonexistent" slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldStatus {
    /// Created and waiting for resolution. The held value is locked.
    Ordered,
    /// Partially executed at least once; the remaining value stays locked.
    ExecutedAndKeptOpen,
    /// Closed by the notary; the requested value was paid to the payee.
    Executed,
    /// Returned to the payer by the notary.
    ReleasedByNotary,
    /// Returned to the payer by the payee.
    ReleasedByPayee,
    /// Returned to the payer after expiration (callable by anyone).
    ReleasedByExpiration,
}

impl HoldStatus {
    /// Returns the string representation used in errors and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::ExecutedAndKeptOpen => "executed-and-kept-open",
            Self::Executed => "executed",
            Self::ReleasedByNotary => "released-by-notary",
            Self::ReleasedByPayee => "released-by-payee",
            Self::ReleasedByExpiration => "released-by-expiration",
        }
    }

    /// Returns the numeric wire code of this status.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Ordered => 1,
            Self::Executed => 2,
            Self::ReleasedByNotary => 3,
            Self::ReleasedByPayee => 4,
            Self::ReleasedByExpiration => 5,
            Self::ExecutedAndKeptOpen => 6,
        }
    }

    /// Returns `true` if the hold still locks value and accepts transitions.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Ordered | Self::ExecutedAndKeptOpen)
    }

    /// Returns `true` if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for HoldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Absolute expiration of a hold, in seconds since the Unix epoch.
///
/// `Never` marks a perpetual hold and encodes as 0 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expiration {
    /// The hold never expires.
    Never,
    /// The hold expires at the given instant (inclusive).
    At(u64),
}

impl Expiration {
    /// Builds an expiration from a relative duration: 0 means perpetual,
    /// anything else means `now + duration`.
    #[must_use]
    pub fn from_duration(now: u64, duration: u64) -> Self {
        if duration == 0 {
            Self::Never
        } else {
            Self::At(now.saturating_add(duration))
        }
    }

    /// Returns `true` if the hold counts as expired at `now`.
    ///
    /// A hold expires the instant the clock reaches its expiration.
    #[must_use]
    pub const fn is_expired_at(&self, now: u64) -> bool {
        match self {
            Self::Never => false,
            Self::At(at) => now >= *at,
        }
    }

    /// Returns the wire encoding: the instant, or 0 for `Never`.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        match self {
            Self::Never => 0,
            Self::At(at) => *at,
        }
    }
}

/// A conditional earmark of part of a payer's balance.
///
/// `value` only ever decreases (via partial execution) and is kept at its
/// last remaining amount after the hold terminates, for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Account that created the hold: the payer, or an operator acting for
    /// the payer.
    pub issuer: String,
    /// Account whose balance is earmarked.
    pub payer: String,
    /// Account entitled to receive the held value upon execution.
    pub payee: String,
    /// Third party authorized to execute or release the hold before
    /// expiration.
    pub notary: String,
    /// Remaining held value. Positive while the hold is active.
    pub value: u64,
    /// When the hold becomes releasable by anyone.
    pub expiration: Expiration,
    /// Current lifecycle status.
    pub status: HoldStatus,
}

impl Hold {
    /// Creates a new hold in status [`HoldStatus::Ordered`].
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        payer: impl Into<String>,
        payee: impl Into<String>,
        notary: impl Into<String>,
        value: u64,
        expiration: Expiration,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            payer: payer.into(),
            payee: payee.into(),
            notary: notary.into(),
            value,
            expiration,
            status: HoldStatus::Ordered,
        }
    }

    /// Returns `true` if the hold counts as expired at `now`.
    #[must_use]
    pub const fn is_expired_at(&self, now: u64) -> bool {
        self.expiration.is_expired_at(now)
    }
}
