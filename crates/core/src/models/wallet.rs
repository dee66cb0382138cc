//! Wallet balance entries.
//!
//! Each user owns an ordered collection of [`WalletEntry`] values, one per
//! asset. Balances are asset-native units; `value_usd` is the holding priced
//! in the reference currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Assets treated as the reference currency: their USD value always equals
/// their balance.
pub const REFERENCE_ASSETS: &[&str] = &["USD", "USDC", "USDT"];

/// Returns true if the asset is a reference-currency asset.
#[must_use]
pub fn is_reference_asset(asset_id: &str) -> bool {
    REFERENCE_ASSETS.contains(&asset_id)
}

/// Display name for a known asset symbol, falling back to the symbol itself.
#[must_use]
pub fn asset_display_name(asset_id: &str) -> &str {
    match asset_id {
        "BTC" => "Bitcoin",
        "ETH" => "Ethereum",
        "USD" => "US Dollar",
        "USDC" => "USD Coin",
        "USDT" => "USD Tether",
        other => other,
    }
}

/// One asset balance bucket owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEntry {
    /// Asset symbol, e.g. "BTC".
    pub asset_id: String,
    /// Human-readable asset name.
    pub name: String,
    /// Balance in asset-native units. Never negative.
    pub balance: Decimal,
    /// Balance priced in the reference currency.
    pub value_usd: Decimal,
}

impl WalletEntry {
    /// Creates an entry with an explicit balance and value.
    #[must_use]
    pub fn new(asset_id: impl Into<String>, balance: Decimal, value_usd: Decimal) -> Self {
        let asset_id = asset_id.into();
        let name = asset_display_name(&asset_id).to_string();
        Self {
            asset_id,
            name,
            balance,
            value_usd,
        }
    }

    /// Creates an empty (zero balance) entry.
    #[must_use]
    pub fn empty(asset_id: impl Into<String>) -> Self {
        Self::new(asset_id, Decimal::ZERO, Decimal::ZERO)
    }

    /// The implied unit price, `value_usd / balance`.
    ///
    /// Returns `None` for a zero balance, where no meaningful price exists.
    #[must_use]
    pub fn unit_price(&self) -> Option<Decimal> {
        if self.balance.is_zero() {
            None
        } else {
            Some(self.value_usd / self.balance)
        }
    }

    /// Returns true if this entry holds a reference-currency asset.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        is_reference_asset(&self.asset_id)
    }
}

/// The wallet set given to every newly registered user: a promotional
/// reference-currency credit plus empty majors.
#[must_use]
pub fn default_wallets() -> Vec<WalletEntry> {
    let hundred = Decimal::from(100);
    vec![
        WalletEntry::new("USDC", hundred, hundred),
        WalletEntry::empty("BTC"),
        WalletEntry::empty("ETH"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_assets() {
        assert!(is_reference_asset("USDC"));
        assert!(is_reference_asset("USD"));
        assert!(is_reference_asset("USDT"));
        assert!(!is_reference_asset("BTC"));
    }

    #[test]
    fn test_asset_display_name_known() {
        assert_eq!(asset_display_name("BTC"), "Bitcoin");
        assert_eq!(asset_display_name("USDC"), "USD Coin");
    }

    #[test]
    fn test_asset_display_name_unknown_falls_back_to_symbol() {
        assert_eq!(asset_display_name("XYZ"), "XYZ");
    }

    #[test]
    fn test_unit_price() {
        let entry = WalletEntry::new("ETH", dec!(2), dec!(4000));
        assert_eq!(entry.unit_price(), Some(dec!(2000)));
    }

    #[test]
    fn test_unit_price_zero_balance() {
        let entry = WalletEntry::empty("BTC");
        assert_eq!(entry.unit_price(), None);
    }

    #[test]
    fn test_default_wallets_welcome_credit() {
        let wallets = default_wallets();
        assert_eq!(wallets.len(), 3);

        let usdc = wallets.iter().find(|w| w.asset_id == "USDC").unwrap();
        assert_eq!(usdc.balance, dec!(100));
        assert_eq!(usdc.value_usd, dec!(100));

        let btc = wallets.iter().find(|w| w.asset_id == "BTC").unwrap();
        assert_eq!(btc.balance, Decimal::ZERO);
        assert_eq!(btc.value_usd, Decimal::ZERO);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let entry = WalletEntry::new("BTC", dec!(0.5), dec!(20000));
        let json = serde_json::to_string(&entry).unwrap();
        let back: WalletEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
