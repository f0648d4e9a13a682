use chrono::{Duration, NaiveDate};

use crate::calendar::YearMonth;

/// The open invoice of a credit card: `(last_closing, next_closing]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCycle {
    pub last_closing: NaiveDate,
    pub next_closing: NaiveDate,
}

impl BillingCycle {
    /// An expense dated exactly on a closing day belongs to the invoice that
    /// closes that day, so the lower bound is exclusive and the upper inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.last_closing < date && date <= self.next_closing
    }

    /// First and last month a date inside the cycle can fall in.
    pub fn month_span(&self) -> (YearMonth, YearMonth) {
        let first_open_day = self.last_closing + Duration::days(1);
        (YearMonth::of(first_open_day), YearMonth::of(self.next_closing))
    }

    /// Payment due date of the invoice closing at `next_closing`: the first
    /// day after the closing whose day-of-month is `due_day` (clamped to the
    /// month's length).
    pub fn due_date(&self, due_day: u32) -> NaiveDate {
        let closing_month = YearMonth::of(self.next_closing);
        let same_month = closing_month.day_clamped(due_day);
        if same_month > self.next_closing {
            same_month
        } else {
            closing_month.succ().day_clamped(due_day)
        }
    }
}

/// The invoice cycle that is open on `as_of` for a card closing on `closing_day`.
///
/// This month's closing date is `min(closing_day, days in month)`. Once
/// `as_of` is past it the open invoice runs to next month's closing;
/// otherwise it runs from last month's closing to this month's.
pub fn current_cycle(closing_day: u32, as_of: NaiveDate) -> BillingCycle {
    let day = closing_day.clamp(1, 31);
    let this_month = YearMonth::of(as_of);
    let this_closing = this_month.day_clamped(day);

    if as_of > this_closing {
        BillingCycle {
            last_closing: this_closing,
            next_closing: this_month.succ().day_clamped(day),
        }
    } else {
        BillingCycle {
            last_closing: this_month.pred().day_clamped(day),
            next_closing: this_closing,
        }
    }
}

#[cfg(test)]
#[path = "billing_tests.rs"]
mod tests;
