//! Average-cost bookkeeping for investment positions.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::error::InvestmentError;
use crate::models::{AssetType, InvestmentAsset, Purchase};
use crate::money::{div_floor, Money};

/// Volume-weighted average price after buying `purchase_quantity` units at
/// `purchase_price` on top of `quantity` units held at `average`.
///
/// An empty (or oversold) position restarts at the purchase price.
pub fn average_price(
    quantity: Decimal,
    average: Money,
    purchase_quantity: Decimal,
    purchase_price: Money,
) -> Money {
    if quantity <= Decimal::ZERO {
        return purchase_price;
    }
    let denominator = quantity + purchase_quantity;
    if denominator <= Decimal::ZERO {
        return Money::ZERO;
    }
    (average.times(quantity) + purchase_price.times(purchase_quantity)).div(denominator)
}

/// Fold one purchase into the asset's quantity and average price.
pub fn apply_purchase(
    asset: &mut InvestmentAsset,
    purchase: &Purchase,
) -> Result<(), InvestmentError> {
    if purchase.asset_id != asset.id {
        return Err(InvestmentError::AssetMismatch {
            asset: asset.id,
            purchase: purchase.asset_id,
        });
    }
    validate(purchase.quantity, purchase.price_per_unit)?;

    asset.average_price = average_price(
        asset.quantity,
        asset.average_price,
        purchase.quantity,
        purchase.price_per_unit,
    );
    asset.quantity += purchase.quantity;
    Ok(())
}

/// What a cash amount buys at a unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashPurchase {
    pub quantity: Decimal,
    pub spent: Money,
    pub leftover: Money,
}

/// Largest quantity affordable with `cash`, floored to the asset's precision
/// so that `spent` never exceeds `cash`. `None` unless both are positive.
pub fn quantity_for_cash(asset_type: AssetType, cash: Money, price: Money) -> Option<CashPurchase> {
    if !cash.is_positive() || !price.is_positive() {
        return None;
    }
    let quantity = div_floor(cash.amount(), price.amount(), asset_type.quantity_decimals());
    let spent = price.times(quantity);
    Some(CashPurchase {
        quantity,
        spent,
        leftover: cash - spent,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub quantity: Decimal,
    pub average_price: Money,
}

impl Position {
    pub fn cost_basis(&self) -> Money {
        self.average_price.times(self.quantity)
    }
}

/// Replay a purchase log in order. Entries with a non-positive quantity or
/// price are skipped.
pub fn rebuild(purchases: &[Purchase]) -> Position {
    purchases.iter().fold(Position::default(), |pos, p| {
        if validate(p.quantity, p.price_per_unit).is_err() {
            debug!(asset = p.asset_id, date = %p.date, "skipping invalid purchase");
            return pos;
        }
        Position {
            average_price: average_price(pos.quantity, pos.average_price, p.quantity, p.price_per_unit),
            quantity: pos.quantity + p.quantity,
        }
    })
}

/// Parse quantity and unit price as typed by a user.
pub fn parse_purchase(quantity: &str, price: &str) -> Result<(Decimal, Money), InvestmentError> {
    let qty = Decimal::from_str(quantity.trim().replace(',', "").as_str())
        .map_err(|_| InvestmentError::Unparseable(quantity.to_string()))?;
    let unit = Money::from_str(price.trim().trim_start_matches('$').replace(',', "").as_str())
        .map_err(|_| InvestmentError::Unparseable(price.to_string()))?;
    validate(qty, unit)?;
    Ok((qty, unit))
}

fn validate(quantity: Decimal, price: Money) -> Result<(), InvestmentError> {
    if quantity <= Decimal::ZERO || !price.is_positive() {
        return Err(InvestmentError::InvalidPurchase {
            quantity,
            price: price.amount(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "investment_tests.rs"]
mod tests;
