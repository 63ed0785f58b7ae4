//! Summary cards and the month filter shared by the dashboard and reports pages.

use maud::{Markup, html};
use time::Month;

use crate::{
    aggregation::Totals,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, format_currency},
    period::MonthPeriod,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";
const AMOUNT_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const AMOUNT_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Gets the CSS class for coloring amounts (green for positive, red for negative).
fn amount_color_class(amount: f64) -> &'static str {
    if amount >= 0.0 {
        AMOUNT_GREEN_STYLE
    } else {
        AMOUNT_RED_STYLE
    }
}

fn summary_card(id: &str, title: &str, amount: f64, color_class: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h4 class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (title) }
            div class={"text-2xl font-bold " (color_class)} { (format_currency(amount)) }
        }
    }
}

/// Renders the balance, income and expense totals, plus the credit card bill when given.
pub(crate) fn totals_cards(totals: &Totals, credit_card_bill: Option<f64>) -> Markup {
    html! {
        section class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-8"
        {
            (summary_card("balance", "Balance", totals.balance, amount_color_class(totals.balance)))
            (summary_card("income", "Income", totals.income, AMOUNT_GREEN_STYLE))
            (summary_card("expense", "Expenses", totals.expense, AMOUNT_RED_STYLE))

            @if let Some(bill) = credit_card_bill {
                (summary_card("credit-card-bill", "Credit Card Bill", bill, AMOUNT_RED_STYLE))
            }
        }
    }
}

/// A form that reloads `endpoint` for the chosen month and year.
pub(crate) fn month_filter(endpoint: &str, selected: MonthPeriod, years: &[i32]) -> Markup {
    let months = std::iter::successors(Some(Month::January), |month| Some(month.next())).take(12);

    html! {
        form
            method="get"
            action=(endpoint)
            id="month-filter"
            class="w-full flex flex-wrap items-end gap-4 mb-6"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for month in months {
                        option value=(month as u8) selected[month == selected.month()] { (month) }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                select name="year" id="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in years {
                        option value=(year) selected[*year == selected.year()] { (year) }
                    }
                }
            }

            div
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
            }
        }
    }
}

/// The years to offer in the month filter, which always include the selected year.
pub(crate) fn selectable_years(mut years: Vec<i32>, selected: MonthPeriod) -> Vec<i32> {
    if let Err(index) = years.binary_search(&selected.year()) {
        years.insert(index, selected.year());
    }

    years
}
