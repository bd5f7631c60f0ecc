//! Core state types: participant addresses, deposit records, and transfers.
//!
//! All monetary values are in base units (1 COIN = 10^8 units) and all
//! timestamps are Unix seconds supplied by the caller. The engine never
//! reads an ambient clock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// A 20-byte participant identifier.
///
/// Opaque to the engine: key derivation, signing, and ownership proofs are
/// the execution environment's concern. Displayed and parsed as 40 hex
/// characters.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create an address from a byte array.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|v: Vec<u8>| AddressError::InvalidLength(v.len()))?;
        Ok(Self(bytes))
    }
}

/// Per-participant deposit record. Created on first contact with the pool,
/// mutated on every interaction, never destroyed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    /// Accumulated deposits in base units. Principal is never returned;
    /// only dividends and commissions flow out.
    pub balance: u64,
    /// Accrual rate in basis points per day, locked at the most recent
    /// deposit. Does not decay between deposits.
    pub rate_bps: u64,
    /// Time of the first value-bearing deposit. `None` for records created
    /// by a zero-value touch that never deposited. Gates commission
    /// eligibility for this participant's downline deposits.
    pub joined_at: Option<u64>,
    /// Dividends have been paid up to this instant.
    pub last_settlement: u64,
    /// Recorded at the first deposit, immutable afterward. Weak reference:
    /// the referrer need not have a record of its own.
    pub referrer: Option<Address>,
}

/// What an outbound transfer pays for.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferKind {
    /// Settled dividends owed to the interacting participant.
    Dividend,
    /// Referral commission to an ancestor at the given level (1-based).
    Commission { level: u8 },
}

/// A single outbound payment for the execution environment to deliver.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Recipient address.
    pub to: Address,
    /// Amount in base units.
    pub amount: u64,
    /// Dividend or commission.
    pub kind: TransferKind,
}
