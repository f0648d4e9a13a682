use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use crate::calendar::{parse_date, YearMonth};
use crate::config::Config;
use crate::investment::parse_purchase;
use crate::ledger::Ledger;
use crate::money::Money;

use super::format::{format_amount, format_change, format_pct, truncate};

pub fn as_cli(args: &[String], ledger: &mut Ledger, config: &Config) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };
    let rest = args.get(2..).unwrap_or_default();
    let user_id = user_flag(rest, config)?;
    match command.as_str() {
        "import" => cli_import(rest, ledger, config, user_id),
        "summary" | "s" => cli_summary(rest, ledger, user_id),
        "trend" => cli_trend(rest, ledger, config, user_id),
        "accounts" => cli_accounts(ledger, user_id),
        "invoice" => cli_invoice(rest, ledger, user_id),
        "pay" => cli_pay(rest, ledger, user_id),
        "buy" => cli_buy(rest, ledger, user_id),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("ledgercast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

pub fn print_usage() {
    println!("ledgercast: installment projection and balances for a personal ledger");
    println!();
    println!("Usage: ledgercast <command> [--user <id>]");
    println!();
    println!("Commands:");
    println!("  import <file.csv>             Migrate a legacy CSV export");
    println!("  summary [YYYY-MM]             Income, expenses and categories for a month");
    println!("  trend [N]                     Expenses over the last N months");
    println!("  accounts                      Balances, open invoices and available credit");
    println!("  invoice <account-id>          Items of a card's open invoice");
    println!("  pay <transaction-id>          Mark the next installment as paid");
    println!("  buy <asset-id>                Buy an asset with cash");
    println!("    --cash <amount>             Cash to spend");
    println!("    --price <amount>            Unit price");
    println!("    --date <YYYY-MM-DD>         Purchase date (default: today)");
    println!("  --user <id>                   User to act as (default from config)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].as_str())
}

/// First argument that is not a flag. Every flag takes a value, so
/// `--flag value` pairs are skipped together.
fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with('-') {
            iter.next();
            continue;
        }
        return Some(arg.as_str());
    }
    None
}

fn user_flag(args: &[String], config: &Config) -> Result<i64> {
    match flag(args, "--user") {
        Some(raw) => raw.parse().with_context(|| format!("Invalid user id: {raw}")),
        None => Ok(config.default_user_id),
    }
}

fn parse_id(raw: Option<&str>, what: &str) -> Result<i64> {
    let Some(raw) = raw else {
        bail!("Usage: ledgercast {what} <id>");
    };
    raw.parse().with_context(|| format!("Invalid id: {raw}"))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn cli_import(args: &[String], ledger: &mut Ledger, config: &Config, user_id: i64) -> Result<()> {
    let Some(file_path) = positional(args) else {
        bail!("Usage: ledgercast import <file.csv> [--user <id>]");
    };
    let path = Path::new(file_path);
    if !path.exists() {
        bail!("File not found: {file_path}");
    }

    let outcome = ledger.import(user_id, path, &config.card_classifier())?;
    for skipped in &outcome.skipped {
        eprintln!("  line {}: {}", skipped.line, skipped.reason);
    }
    println!(
        "Imported {} new transactions ({} duplicates, {} rows skipped)",
        outcome.inserted,
        outcome.duplicates,
        outcome.skipped.len()
    );
    Ok(())
}

fn cli_summary(args: &[String], ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let month = match positional(args) {
        Some(raw) => raw
            .parse::<YearMonth>()
            .with_context(|| format!("Invalid month '{raw}', expected YYYY-MM"))?,
        None => YearMonth::of(today()),
    };

    let previous = ledger.month_summary(user_id, month.pred())?.clone();
    let summary = ledger.month_summary(user_id, month)?;
    let comparison = crate::aggregate::compare_months(summary, &previous);

    println!("ledgercast: {month}");
    println!("{}", "─".repeat(44));
    println!("  Income:       {:>16}", format_amount(summary.income));
    println!("  Expenses:     {:>16}", format_amount(summary.expense));
    println!("  Net:          {:>16}", format_amount(summary.net()));
    println!(
        "  vs {}:   {:>16} ({})",
        previous.month,
        format_change(comparison.expense_change),
        format_pct(comparison.expense_change_pct)
    );

    if !summary.categories.is_empty() {
        println!();
        println!("Spending by Category:");
        for cat in &summary.categories {
            println!(
                "  {:<24} {:>14}  ({} items)",
                truncate(&cat.category, 24),
                format_amount(cat.total),
                cat.count
            );
        }
    }

    let pending: Vec<_> = summary.occurrences.iter().filter(|o| !o.paid).collect();
    if !pending.is_empty() {
        println!();
        println!("Unpaid:");
        for occ in pending {
            println!(
                "  {} {:<6} {:>14}  #{}",
                occ.date,
                occ.installment_label().unwrap_or_default(),
                format_amount(occ.amount),
                occ.source_id
            );
        }
    }
    Ok(())
}

fn cli_trend(args: &[String], ledger: &mut Ledger, config: &Config, user_id: i64) -> Result<()> {
    let months = match positional(args) {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("Invalid month count: {raw}"))?,
        None => config.summary_months,
    };
    let trend = ledger.trend(user_id, months, YearMonth::of(today()))?;

    println!("{:<8} {:>14} {:>14} {:>14}  Top category", "Month", "Income", "Expenses", "Net");
    println!("{}", "─".repeat(72));
    for summary in &trend {
        println!(
            "{:<8} {:>14} {:>14} {:>14}  {}",
            summary.month.key(),
            format_amount(summary.income),
            format_amount(summary.expense),
            format_amount(summary.net()),
            summary
                .top_category()
                .map(|c| truncate(&c.category, 20))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn cli_accounts(ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let dashboard = ledger.dashboard(user_id, today())?;
    if dashboard.accounts.is_empty() {
        println!("No accounts");
        return Ok(());
    }

    println!(
        "{:<4} {:<20} {:<12} {:>14} {:>14} {:>14}  Due",
        "ID", "Name", "Type", "Balance", "Invoice", "Available"
    );
    println!("{}", "─".repeat(96));
    for view in &dashboard.accounts {
        let acct = &view.account;
        println!(
            "{:<4} {:<20} {:<12} {:>14} {:>14} {:>14}  {}",
            acct.id,
            truncate(&acct.name, 20),
            acct.account_type().as_str(),
            format_amount(view.balance),
            view.invoice.map(format_amount).unwrap_or_default(),
            view.available_credit.map(format_amount).unwrap_or_default(),
            view.due_date.map(|d| d.to_string()).unwrap_or_default(),
        );
    }
    println!();
    println!(
        "This month: income {}, expenses {}",
        format_amount(dashboard.month_totals.income),
        format_amount(dashboard.month_totals.expense)
    );
    Ok(())
}

fn cli_invoice(args: &[String], ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let account_id = parse_id(positional(args), "invoice")?;
    let invoice = ledger.invoice(user_id, account_id, today())?;

    println!(
        "{}: {} to {}",
        invoice.account.name, invoice.cycle.last_closing, invoice.cycle.next_closing
    );
    println!("{}", "─".repeat(44));
    for item in &invoice.items {
        println!(
            "  {} {:<6} {:<14} {:>14}",
            item.date,
            item.installment_label().unwrap_or_default(),
            truncate(item.category.as_deref().unwrap_or(""), 14),
            format_amount(item.amount)
        );
    }
    println!("  {:<32} {:>14}", "Total", format_amount(invoice.total));
    if let Some(due) = invoice.due_date {
        println!("  Due {due}");
    }
    Ok(())
}

fn cli_pay(args: &[String], ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let txn_id = parse_id(positional(args), "pay")?;
    match ledger.pay_installment(user_id, txn_id)? {
        Some(amount) => println!("Paid installment of {} on #{txn_id}", format_amount(amount)),
        None => println!("#{txn_id} has no installment left to pay"),
    }
    Ok(())
}

fn cli_buy(args: &[String], ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let asset_id = parse_id(positional(args), "buy")?;
    let (Some(cash), Some(price)) = (flag(args, "--cash"), flag(args, "--price")) else {
        bail!("Usage: ledgercast buy <asset-id> --cash <amount> --price <amount> [--date <YYYY-MM-DD>]");
    };
    let cash = Money::parse_lenient(cash);
    let (_, price) = parse_purchase("1", price)?;
    let date = match flag(args, "--date") {
        Some(raw) => parse_date(raw).with_context(|| format!("Invalid date '{raw}', expected YYYY-MM-DD"))?,
        None => today(),
    };

    let (order, asset) = ledger.buy(user_id, asset_id, cash, price, date)?;
    println!(
        "Bought {} {} for {} ({} left over)",
        order.quantity,
        asset.symbol,
        format_amount(order.spent),
        format_amount(order.leftover)
    );
    println!(
        "Position: {} at average {} (cost {})",
        asset.quantity,
        format_amount(asset.average_price),
        format_amount(asset.cost_basis())
    );
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
