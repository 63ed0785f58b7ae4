use axum::{Extension, extract::State, response::Response};
use axum_extra::extract::{Form, PrivateCookieJar};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    add::AddState,
    auth::UserID,
    card::{DueDay, create_card},
    db::lock_connection,
    endpoints,
    flash::{Flash, redirect_with_flash},
    transaction::{Transaction, TransactionType, create_transaction},
    validation::{optional_text, parse_amount, required_field},
};

/// The description given to fixed income.
const FIXED_INCOME_DESCRIPTION: &str = "Fixed income";
/// The payment method given to fixed income.
const FIXED_INCOME_PAYMENT_METHOD: &str = "Transferencia";
/// The category given to fixed income.
const FIXED_INCOME_CATEGORY: &str = "Salary";

/// The fields of the three forms on the add page.
///
/// `action` says which form was submitted and so which of the other fields are used.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddForm {
    pub action: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub category: Option<String>,
    pub income_value: Option<String>,
    pub card_name: Option<String>,
    pub card_due_day: Option<String>,
}

/// Handle a submission from one of the forms on the add page.
///
/// Successful submissions go to the dashboard, invalid ones go back to the add page.
/// Either way the outcome is shown in a flash message.
pub async fn add_endpoint(
    State(state): State<AddState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<AddForm>,
) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| apply(&form, user_id, &connection));

    match result {
        Ok(message) => {
            redirect_with_flash(jar, endpoints::DASHBOARD_VIEW, Flash::success(message))
        }
        Err(error) => {
            tracing::debug!("Rejected add form for user {user_id}: {error}");
            redirect_with_flash(
                jar,
                endpoints::ADD_VIEW,
                Flash::error(error.client_message()),
            )
        }
    }
}

/// Validate and store the submitted form, returning the success message.
fn apply(form: &AddForm, user_id: UserID, connection: &Connection) -> Result<&'static str, Error> {
    match form.action.as_deref().map(str::trim) {
        Some("add_transaction") => {
            add_transaction(form, user_id, connection)?;
            Ok("Transaction added successfully!")
        }
        Some("add_income") => {
            add_income(form, user_id, connection)?;
            Ok("Fixed income added successfully!")
        }
        Some("add_card") => {
            add_card(form, user_id, connection)?;
            Ok("Card added successfully!")
        }
        Some(action) => Err(Error::UnknownAction(action.to_owned())),
        None => Err(Error::UnknownAction(String::new())),
    }
}

fn add_transaction(form: &AddForm, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let type_ = required_field(form.type_.as_deref(), "type")?;
    let amount = required_field(form.amount.as_deref(), "amount")?;
    let payment_method = required_field(form.payment_method.as_deref(), "payment_method")?;
    let category = required_field(form.category.as_deref(), "category")?;

    let transaction = Transaction::build(type_.parse()?, parse_amount(amount)?)
        .description(optional_text(form.description.as_deref()))
        .payment_method(Some(payment_method.to_owned()))
        .category(Some(category.to_owned()));

    let transaction = create_transaction(user_id, transaction, connection)?;
    tracing::info!("User {user_id} added transaction {}", transaction.id);

    Ok(())
}

fn add_income(form: &AddForm, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let amount = parse_amount(required_field(form.income_value.as_deref(), "income_value")?)?;

    let transaction = Transaction::build(TransactionType::Income, amount)
        .description(Some(FIXED_INCOME_DESCRIPTION.to_owned()))
        .payment_method(Some(FIXED_INCOME_PAYMENT_METHOD.to_owned()))
        .category(Some(FIXED_INCOME_CATEGORY.to_owned()));

    let transaction = create_transaction(user_id, transaction, connection)?;
    tracing::info!("User {user_id} added fixed income {}", transaction.id);

    Ok(())
}

fn add_card(form: &AddForm, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let name = required_field(form.card_name.as_deref(), "card_name")?;
    let due_day = DueDay::parse(required_field(form.card_due_day.as_deref(), "card_due_day")?)?;

    let card = create_card(user_id, name, due_day, connection)?;
    tracing::info!("User {user_id} added card {}", card.id);

    Ok(())
}
