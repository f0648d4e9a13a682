mod account;
mod asset;
mod occurrence;
mod transaction;

pub use account::{Account, AccountType};
pub use asset::{AssetType, InvestmentAsset, Purchase};
pub use occurrence::Occurrence;
pub use transaction::{InstallmentPlan, Transaction, TransactionKind};
