use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Bank,
    CreditCard,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "Bank",
            Self::CreditCard => "Credit Card",
        }
    }

    pub fn is_credit(&self) -> bool {
        matches!(self, Self::CreditCard)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub initial_balance: Money,
    pub card_limit: Option<Money>,
    /// 1-31; only meaningful on credit cards.
    pub closing_day: Option<u32>,
    pub due_day: Option<u32>,
}

impl Account {
    pub fn new_bank(id: i64, name: impl Into<String>, initial_balance: Money) -> Self {
        Self {
            id,
            name: name.into(),
            initial_balance,
            card_limit: None,
            closing_day: None,
            due_day: None,
        }
    }

    pub fn new_card(
        id: i64,
        name: impl Into<String>,
        card_limit: Money,
        closing_day: u32,
        due_day: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            initial_balance: Money::ZERO,
            card_limit: Some(card_limit),
            closing_day: Some(closing_day),
            due_day: Some(due_day),
        }
    }

    /// A credit card is any account with a positive limit.
    pub fn account_type(&self) -> AccountType {
        match self.card_limit {
            Some(limit) if limit.is_positive() => AccountType::CreditCard,
            _ => AccountType::Bank,
        }
    }

    pub fn is_credit_card(&self) -> bool {
        self.account_type().is_credit()
    }

    /// Closing day used for invoice cycles, present only on credit cards.
    pub fn billing_closing_day(&self) -> Option<u32> {
        if self.is_credit_card() {
            self.closing_day
        } else {
            None
        }
    }
}
