//! Wallet ledger: balance mutation and revaluation.
//!
//! [`apply_delta`] is pure; it takes the current wallet collection and
//! returns the updated one without touching storage, so callers decide when
//! (and whether) to persist.
//!
//! # Valuation
//! `value_usd` is recomputed from the entry's prior unit price
//! (`value_usd / balance`). Reference-currency entries always satisfy
//! `value_usd == balance`. A zero prior balance has no unit price, so the
//! delta is priced 1:1.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::wallet::{is_reference_asset, WalletEntry};

/// Errors produced by ledger mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The mutation would drive a balance negative.
    #[error("insufficient funds in {asset}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Asset whose balance was insufficient.
        asset: String,
        /// Balance at the time of the attempt.
        balance: Decimal,
        /// Magnitude of the attempted debit.
        requested: Decimal,
    },
}

impl LedgerError {
    /// Creates an insufficient funds error.
    pub fn insufficient_funds(
        asset: impl Into<String>,
        balance: Decimal,
        requested: Decimal,
    ) -> Self {
        Self::InsufficientFunds {
            asset: asset.into(),
            balance,
            requested,
        }
    }
}

/// Applies a signed `delta` to the `asset_id` balance within `wallets`.
///
/// A missing entry is created when `delta` is positive. The input collection
/// is never mutated; on error nothing is applied.
///
/// # Errors
/// Returns [`LedgerError::InsufficientFunds`] when the resulting balance
/// would be negative.
pub fn apply_delta(
    wallets: &[WalletEntry],
    asset_id: &str,
    delta: Decimal,
) -> Result<Vec<WalletEntry>, LedgerError> {
    let mut updated = wallets.to_vec();

    match updated.iter_mut().find(|w| w.asset_id == asset_id) {
        Some(entry) => {
            let new_balance = entry.balance + delta;
            if new_balance < Decimal::ZERO {
                return Err(LedgerError::insufficient_funds(
                    asset_id,
                    entry.balance,
                    delta.abs(),
                ));
            }
            entry.value_usd = revalue(entry, new_balance);
            entry.balance = new_balance;
        }
        None => {
            if delta < Decimal::ZERO {
                return Err(LedgerError::insufficient_funds(
                    asset_id,
                    Decimal::ZERO,
                    delta.abs(),
                ));
            }
            if delta > Decimal::ZERO {
                // New entries have no price history; the credit is valued 1:1.
                updated.push(WalletEntry::new(asset_id, delta, delta));
            }
        }
    }

    Ok(updated)
}

/// Looks up the current balance for `asset_id`, zero if no entry exists.
#[must_use]
pub fn balance_of(wallets: &[WalletEntry], asset_id: &str) -> Decimal {
    wallets
        .iter()
        .find(|w| w.asset_id == asset_id)
        .map_or(Decimal::ZERO, |w| w.balance)
}

/// Total portfolio value in the reference currency.
#[must_use]
pub fn total_value_usd(wallets: &[WalletEntry]) -> Decimal {
    wallets.iter().map(|w| w.value_usd).sum()
}

fn revalue(entry: &WalletEntry, new_balance: Decimal) -> Decimal {
    if is_reference_asset(&entry.asset_id) {
        return new_balance;
    }
    match entry.unit_price() {
        Some(price) => price * new_balance,
        None => new_balance,
    }
}
