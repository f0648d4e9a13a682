use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvestmentError {
    /// Zero or negative quantity/price. The position is left untouched.
    #[error("No valid purchase: quantity {quantity} at price {price}")]
    InvalidPurchase { quantity: Decimal, price: Decimal },
    #[error("Could not parse purchase input '{0}'")]
    Unparseable(String),
    #[error("Purchase for asset {purchase} cannot be applied to asset {asset}")]
    AssetMismatch { asset: i64, purchase: i64 },
}
