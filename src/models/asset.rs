use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    ListedEquity,
    Crypto,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListedEquity => "listed_equity",
            Self::Crypto => "crypto",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "listed_equity" | "equity" | "stock" | "acao" | "ação" => Some(Self::ListedEquity),
            "crypto" | "cripto" => Some(Self::Crypto),
            _ => None,
        }
    }

    /// Decimal places a purchasable quantity is floored to: whole shares for
    /// listed equities, satoshi precision for crypto.
    pub fn quantity_decimals(&self) -> u32 {
        match self {
            Self::ListedEquity => 0,
            Self::Crypto => 8,
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentAsset {
    pub id: i64,
    pub asset_type: AssetType,
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Money,
}

impl InvestmentAsset {
    pub fn new(id: i64, asset_type: AssetType, symbol: impl Into<String>) -> Self {
        Self {
            id,
            asset_type,
            symbol: symbol.into(),
            quantity: Decimal::ZERO,
            average_price: Money::ZERO,
        }
    }

    /// Cash put into the current position at its average price.
    pub fn cost_basis(&self) -> Money {
        self.average_price.times(self.quantity)
    }
}

/// One entry of an asset's append-only purchase log.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub asset_id: i64,
    pub date: NaiveDate,
    pub price_per_unit: Money,
    pub quantity: Decimal,
    pub total_invested: Money,
}

impl Purchase {
    pub fn new(asset_id: i64, date: NaiveDate, price_per_unit: Money, quantity: Decimal) -> Self {
        Self {
            asset_id,
            date,
            price_per_unit,
            quantity,
            total_invested: price_per_unit.times(quantity),
        }
    }
}
