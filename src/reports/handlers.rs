//! The monthly reports page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    aggregation::{Totals, available_years, category_breakdown, daily_trend, totals},
    alert::{AlertType, alert},
    auth::UserID,
    card::{Card, get_cards},
    dashboard::{month_filter, selectable_years, totals_cards, transactions_table},
    db::lock_connection,
    endpoints,
    flash::{Flash, take_flash},
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, flash_view},
    navigation::NavBar,
    period::{MonthPeriod, MonthQuery},
    reports::charts::{
        ReportChart, charts_script, charts_view, daily_trend_chart, expenses_by_category_chart,
    },
    transaction::{
        DEFAULT_CATEGORIES, Transaction, get_categories, get_transaction_dates,
        get_transactions_in_range,
    },
};

/// Shown when the month or year in the query string cannot be used.
pub const INVALID_FILTER_WARNING: &str = "Invalid date filter. Showing the current month.";

const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for displaying the reports page.
#[derive(Debug, Clone)]
pub struct ReportsState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for reading transactions and cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ReportsState> for Key {
    fn from_ref(state: &ReportsState) -> Self {
        state.cookie_key.clone()
    }
}

/// Holds all the data needed to render the reports page.
struct ReportData {
    period: MonthPeriod,
    is_fallback: bool,
    years: Vec<i32>,
    totals: Totals,
    charts: [ReportChart; 2],
    transactions: Vec<Transaction>,
    cards: Vec<Card>,
    categories: Vec<String>,
}

fn cards_and_categories_view(cards: &[Card], categories: &[String]) -> Markup {
    html! {
        section class="w-full grid grid-cols-1 md:grid-cols-2 gap-4 mt-8"
        {
            div
            {
                h3 class="text-xl font-semibold mb-2" { "Cards" }

                @if cards.is_empty() {
                    p class="text-gray-600 dark:text-gray-400" { "No cards added yet." }
                } @else {
                    ul id="cards" class="space-y-1"
                    {
                        @for card in cards {
                            li { (card.name) " (due on day " (card.due_day) ")" }
                        }
                    }
                }
            }

            div
            {
                h3 class="text-xl font-semibold mb-2" { "Categories" }

                ul id="categories" class="flex flex-wrap gap-2"
                {
                    @for category in categories {
                        li
                            class="px-2.5 py-0.5 text-xs font-semibold text-blue-800
                                bg-blue-100 rounded-full dark:bg-blue-900 dark:text-blue-300"
                        {
                            (category)
                        }
                    }
                }
            }
        }
    }
}

fn reports_view(data: &ReportData, flash: Option<&Flash>) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();

    let content = html! {
        (nav_bar)
        (flash_view(flash))

        div class=(PAGE_CONTAINER_STYLE)
        {
            @if data.is_fallback {
                div id="filter-warning" class="w-full mb-4"
                {
                    (alert(AlertType::Warning, INVALID_FILTER_WARNING))
                }
            }

            h2 class="w-full text-2xl font-bold mb-4" { "Report for " (data.period.label()) }

            (month_filter(endpoints::REPORTS_VIEW, data.period, &data.years))
            (totals_cards(&data.totals, None))
            (charts_view(&data.charts))

            section class="w-full"
            {
                h3 class="text-xl font-semibold mb-4" { "Transactions" }

                (transactions_table(&data.transactions, false))
            }

            (cards_and_categories_view(&data.cards, &data.categories))
        }
    };

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(&data.charts),
    ];

    base("Reports", &scripts, &content)
}

/// Display the totals, charts and transactions of the month selected by the query string.
///
/// An invalid month or year shows the current month along with a warning.
pub async fn get_reports_page(
    State(state): State<ReportsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let today = OffsetDateTime::now_utc().date();
    let selection = MonthPeriod::from_query(&query, today);
    let period = selection.period;
    let (start, end) = period.utc_range();

    let (transactions, dates, cards, mut categories) = {
        let connection = lock_connection(&state.db_connection)?;

        (
            get_transactions_in_range(user_id, start, end, &connection)
                .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?,
            get_transaction_dates(user_id, &connection)?,
            get_cards(user_id, &connection)?,
            get_categories(user_id, &connection)?,
        )
    };

    if categories.is_empty() {
        categories = DEFAULT_CATEGORIES.map(str::to_owned).to_vec();
    }

    let charts = [
        ReportChart {
            id: "expenses-by-category-chart",
            options: expenses_by_category_chart(&category_breakdown(&transactions)).to_string(),
        },
        ReportChart {
            id: "daily-trend-chart",
            options: daily_trend_chart(&daily_trend(&transactions, period)).to_string(),
        },
    ];

    let data = ReportData {
        period,
        is_fallback: selection.is_fallback,
        years: selectable_years(available_years(&dates, today.year()), period),
        totals: totals(&transactions),
        charts,
        transactions,
        cards,
        categories,
    };

    let (jar, flash) = take_flash(jar);

    Ok((jar, reports_view(&data, flash.as_ref())).into_response())
}
