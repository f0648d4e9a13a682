//! Installment projection, billing cycles and balance aggregation for a
//! personal finance ledger.
//!
//! The engine modules (`money`, `calendar`, `models`, `projector`, `billing`,
//! `aggregate`, `investment`) are pure. `db`, `import` and `ledger` add
//! persistence and the legacy CSV migration on top.

pub mod aggregate;
pub mod billing;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod investment;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod money;
pub mod projector;
pub mod run;

pub use error::{CalendarError, InvestmentError};
pub use ledger::Ledger;
pub use money::Money;
