use chrono::NaiveDate;

use crate::calendar::YearMonth;
use crate::money::Money;

use super::TransactionKind;

/// One dated, amount-bearing effect of a stored transaction.
///
/// Built fresh by every projection and never persisted: the paid flag depends
/// on the source's current `paid` count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub source_id: i64,
    /// 0-based installment index; `None` for single-event transactions.
    pub index: Option<u32>,
    pub installment_total: Option<u32>,
    pub date: NaiveDate,
    pub amount: Money,
    pub paid: bool,
    pub kind: TransactionKind,
    pub account_id: Option<i64>,
    pub category: Option<String>,
}

impl Occurrence {
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }

    pub fn is_installment(&self) -> bool {
        self.index.is_some()
    }

    /// "3/12" for the third of twelve installments.
    pub fn installment_label(&self) -> Option<String> {
        match (self.index, self.installment_total) {
            (Some(index), Some(total)) => Some(format!("{}/{}", index + 1, total)),
            _ => None,
        }
    }
}
