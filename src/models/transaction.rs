use chrono::NaiveDate;

use crate::calendar;
use crate::money::Money;

/// What a stored transaction is, decided when it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    /// `is_paid` only matters for non-installment expenses.
    Expense { is_paid: bool },
    CardExpense,
    Transfer { to_account_id: Option<i64> },
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense { .. } => "expense",
            Self::CardExpense => "card_expense",
            Self::Transfer { .. } => "transfer",
        }
    }

    /// Rebuild a kind from its stored tag plus the columns only some variants use.
    pub fn from_parts(tag: &str, is_paid: bool, to_account_id: Option<i64>) -> Option<Self> {
        match tag {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense { is_paid }),
            "card_expense" => Some(Self::CardExpense),
            "transfer" => Some(Self::Transfer { to_account_id }),
            _ => None,
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }

    /// Expenses and card expenses; both reduce the owning account.
    pub fn is_expense_like(&self) -> bool {
        matches!(self, Self::Expense { .. } | Self::CardExpense)
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer { .. })
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentPlan {
    pub total: u32,
    pub paid: u32,
}

impl InstallmentPlan {
    pub fn new(total: u32, paid: u32) -> Self {
        Self { total, paid }
    }

    /// A zero total is stored on some legacy rows; such a plan is ignored.
    pub fn is_active(&self) -> bool {
        self.total > 0
    }

    /// `paid` never counts past `total`, even if the stored value does.
    pub fn paid_clamped(&self) -> u32 {
        self.paid.min(self.total)
    }

    pub fn remaining(&self) -> u32 {
        self.total - self.paid_clamped()
    }

    pub fn is_settled(&self) -> bool {
        self.remaining() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub kind: TransactionKind,
    /// Always the full amount; installment purchases store the total, not the part.
    pub amount: Money,
    /// `YYYY-MM-DD` as the store holds it. Unparseable dates are skipped by projection.
    pub date: String,
    pub account_id: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub installments: Option<InstallmentPlan>,
}

impl Transaction {
    pub fn new(id: i64, kind: TransactionKind, amount: Money, date: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            amount,
            date: date.into(),
            account_id: None,
            category: None,
            description: None,
            installments: None,
        }
    }

    pub fn with_account(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_installments(mut self, total: u32, paid: u32) -> Self {
        self.installments = Some(InstallmentPlan::new(total, paid));
        self
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        calendar::parse_date(&self.date)
    }

    /// The installment plan, if it is one that actually splits the amount.
    pub fn plan(&self) -> Option<InstallmentPlan> {
        self.installments.filter(InstallmentPlan::is_active)
    }

    pub fn is_installment(&self) -> bool {
        self.plan().is_some()
    }

    pub fn remaining_installments(&self) -> u32 {
        self.plan().map_or(0, |p| p.remaining())
    }

    /// Amount of installment `index` (0-based); the full amount for
    /// non-installment transactions.
    pub fn installment_amount(&self, index: u32) -> Money {
        match self.plan() {
            Some(plan) if index < plan.total => {
                let (per, last) = self.amount.installment_parts(plan.total);
                if index + 1 == plan.total {
                    last
                } else {
                    per
                }
            }
            Some(_) => Money::ZERO,
            None => self.amount,
        }
    }
}
