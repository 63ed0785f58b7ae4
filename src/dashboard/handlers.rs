//! Dashboard HTTP handler and view rendering.

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
    aggregation::{Totals, available_years, credit_card_bill, totals},
    auth::UserID,
    dashboard::{
        cards::{month_filter, selectable_years, totals_cards},
        tables::transactions_table,
    },
    db::lock_connection,
    endpoints,
    flash::{Flash, take_flash},
    html::{BUTTON_DELETE_STYLE, PAGE_CONTAINER_STYLE, base, flash_view},
    navigation::NavBar,
    period::{MonthPeriod, MonthQuery},
    transaction::{Transaction, get_transaction_dates, get_transactions_in_range},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    period: MonthPeriod,
    years: Vec<i32>,
    totals: Totals,
    credit_card_bill: f64,
    transactions: Vec<Transaction>,
}

fn clear_data_form() -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::CLEAR_DATA)
            id="clear-data"
            class="mt-6"
            data-confirm="Delete all of your transactions? This cannot be undone."
        {
            button type="submit" class=(BUTTON_DELETE_STYLE) { "Clear all transactions" }
        }
    }
}

fn dashboard_view(data: &DashboardData, flash: Option<&Flash>) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)
        (flash_view(flash))

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="w-full text-2xl font-bold mb-4" { (data.period.label()) }

            (month_filter(endpoints::DASHBOARD_VIEW, data.period, &data.years))
            (totals_cards(&data.totals, Some(data.credit_card_bill)))

            section class="w-full"
            {
                h3 class="text-xl font-semibold mb-4" { "Transactions" }

                (transactions_table(&data.transactions, true))

                @if !data.transactions.is_empty() {
                    (clear_data_form())
                }
            }
        }
    };

    base("Dashboard", &[], &content)
}

/// Display the totals and transactions of the month selected by the query string.
///
/// An invalid month or year shows the current month.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let today = OffsetDateTime::now_utc().date();
    let period = MonthPeriod::from_query(&query, today).period;
    let (start, end) = period.utc_range();

    let (transactions, dates) = {
        let connection = lock_connection(&state.db_connection)?;

        (
            get_transactions_in_range(user_id, start, end, &connection)
                .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?,
            get_transaction_dates(user_id, &connection)?,
        )
    };

    let data = DashboardData {
        period,
        years: selectable_years(available_years(&dates, today.year()), period),
        totals: totals(&transactions),
        credit_card_bill: credit_card_bill(&transactions),
        transactions,
    };

    let (jar, flash) = take_flash(jar);

    Ok((jar, dashboard_view(&data, flash.as_ref())).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        AppState, UserID,
        auth::auth_guard,
        endpoints,
        test_utils::{create_named_user, create_test_user, get_test_app_state, log_in_cookie},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::get_dashboard_page;

    fn get_test_server(state: &AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state.clone());

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn add(
        state: &AppState,
        user_id: UserID,
        type_: TransactionType,
        amount: f64,
        payment_method: &str,
        date: OffsetDateTime,
    ) {
        create_transaction(
            user_id,
            Transaction::build(type_, amount)
                .payment_method(Some(payment_method.to_owned()))
                .date(date),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
    }

    fn text_of(document: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();

        document
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("No element matching {selector:?}"))
            .text()
            .collect()
    }

    #[tokio::test]
    async fn shows_totals_for_selected_month() {
        let state = get_test_app_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let other = create_named_user(
            "other",
            "other@example.com",
            &state.db_connection.lock().unwrap(),
        );
        let rows = [
            (user.id, TransactionType::Income, 100.0, "Pix", datetime!(2025-03-01 10:00 UTC)),
            (
                user.id,
                TransactionType::Expense,
                30.0,
                "Cartao de Credito",
                datetime!(2025-03-05 10:00 UTC),
            ),
            (user.id, TransactionType::Expense, 10.0, "Pix", datetime!(2025-03-31 23:00 UTC)),
            (user.id, TransactionType::Expense, 500.0, "Pix", datetime!(2025-04-01 00:00 UTC)),
            (other.id, TransactionType::Expense, 900.0, "Pix", datetime!(2025-03-02 10:00 UTC)),
        ];
        for (user_id, type_, amount, payment_method, date) in rows {
            add(&state, user_id, type_, amount, payment_method, date);
        }
        let server = get_test_server(&state);

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_params([("month", "3"), ("year", "2025")])
            .add_cookie(log_in_cookie(user.id))
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert!(document.errors.is_empty(), "{:?}", document.errors);
        assert_eq!(text_of(&document, "#balance div"), "R$60.00");
        assert_eq!(text_of(&document, "#income div"), "R$100.00");
        assert_eq!(text_of(&document, "#expense div"), "R$40.00");
        assert_eq!(text_of(&document, "#credit-card-bill div"), "R$30.00");

        let rows = Selector::parse("tr[data-transaction-id]").unwrap();
        assert_eq!(document.select(&rows).count(), 3);

        let years = Selector::parse("select#year option").unwrap();
        let years: Vec<String> = document
            .select(&years)
            .map(|option| option.text().collect())
            .collect();
        assert_eq!(years, vec!["2025"]);
    }

    #[tokio::test]
    async fn invalid_query_shows_current_month() {
        let state = get_test_app_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        add(&state, user.id, TransactionType::Expense, 12.0, "Pix", OffsetDateTime::now_utc());
        let server = get_test_server(&state);

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_params([("month", "thirteen"), ("year", "2025")])
            .add_cookie(log_in_cookie(user.id))
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_eq!(text_of(&document, "#expense div"), "R$12.00");
    }

    #[tokio::test]
    async fn empty_month_has_no_clear_button() {
        let state = get_test_app_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(&state);

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(log_in_cookie(user.id))
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_eq!(text_of(&document, "#balance div"), "R$0.00");
        let clear = Selector::parse("#clear-data").unwrap();
        assert_eq!(document.select(&clear).count(), 0);
        let empty = Selector::parse("#no-transactions").unwrap();
        assert_eq!(document.select(&empty).count(), 1);
    }

    #[tokio::test]
    async fn redirects_to_log_in_without_cookie() {
        let state = get_test_app_state();
        let server = get_test_server(&state);

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
    }
}
