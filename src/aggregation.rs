//! Aggregates transactions into the totals and series shown on the dashboard and reports.
//!
//! Every function here works on transactions that were already fetched from the database,
//! so callers decide which user and month they cover.

use time::{Month, OffsetDateTime, util::days_in_year_month};

use crate::{
    period::MonthPeriod,
    transaction::{CREDIT_CARD_PAYMENT_METHOD, Transaction, TransactionType},
};

/// The category label for expenses that have no category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The money earned and spent over some set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    /// Always `income - expense`.
    pub balance: f64,
}

/// Sum the income and expenses in `transactions`.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let (income, expense) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expense), transaction| {
                match transaction.type_ {
                    TransactionType::Income => (income + transaction.amount, expense),
                    TransactionType::Expense => (income, expense + transaction.amount),
                }
            });

    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

/// Sum the expenses in `transactions` per category.
///
/// Categories are listed in the order they first appear in `transactions`.
/// Expenses without a category are grouped under [UNCATEGORIZED_LABEL].
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut breakdown: Vec<(String, f64)> = Vec::new();

    for transaction in transactions {
        if transaction.type_ != TransactionType::Expense {
            continue;
        }

        let category = transaction
            .category
            .as_deref()
            .filter(|category| !category.is_empty())
            .unwrap_or(UNCATEGORIZED_LABEL);

        match breakdown.iter_mut().find(|(label, _)| label == category) {
            Some((_, total)) => *total += transaction.amount,
            None => breakdown.push((category.to_owned(), transaction.amount)),
        }
    }

    breakdown
}

/// Income and expense totals for each day of a month.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTrend {
    /// One label per day, e.g. "7/3" for the 7th of March.
    pub labels: Vec<String>,
    /// The income on each day, where the first entry is the 1st of the month.
    pub income: Vec<f64>,
    /// The expenses on each day, where the first entry is the 1st of the month.
    pub expense: Vec<f64>,
}

/// Total the income and expenses of each day in `period`.
///
/// Transactions outside `period` are ignored.
pub fn daily_trend(transactions: &[Transaction], period: MonthPeriod) -> DailyTrend {
    let day_count = usize::from(days_in_month(period.year(), period.month()));
    let mut income = vec![0.0; day_count];
    let mut expense = vec![0.0; day_count];

    for transaction in transactions {
        if !period.contains(transaction.date) {
            continue;
        }

        let index = usize::from(transaction.date.day()) - 1;
        let series = match transaction.type_ {
            TransactionType::Income => &mut income,
            TransactionType::Expense => &mut expense,
        };
        series[index] += transaction.amount;
    }

    let labels = (1..=day_count)
        .map(|day| format!("{day}/{}", period.month_number()))
        .collect();

    DailyTrend {
        labels,
        income,
        expense,
    }
}

/// The distinct years of `dates` in ascending order, or just `current_year` if there are none.
pub fn available_years(dates: &[OffsetDateTime], current_year: i32) -> Vec<i32> {
    let mut years: Vec<i32> = dates.iter().map(|date| date.year()).collect();
    years.sort_unstable();
    years.dedup();

    if years.is_empty() {
        years.push(current_year);
    }

    years
}

/// The total spent on credit cards in `transactions`.
pub fn credit_card_bill(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.type_ == TransactionType::Expense
                && transaction.payment_method.as_deref() == Some(CREDIT_CARD_PAYMENT_METHOD)
        })
        .map(|transaction| transaction.amount)
        .sum()
}

/// The number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: Month) -> u8 {
    days_in_year_month(year, month)
}
