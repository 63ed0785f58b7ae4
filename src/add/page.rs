use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    Error,
    add::AddState,
    auth::UserID,
    card::{Card, DueDay, get_cards},
    db::lock_connection,
    endpoints,
    flash::{Flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, flash_view,
    },
    navigation::NavBar,
    transaction::{DEFAULT_CATEGORIES, PAYMENT_METHODS, get_categories},
};

fn label(for_: &str, text: &str) -> Markup {
    html! {
        label for=(for_) class=(FORM_LABEL_STYLE) { (text) }
    }
}

fn action_input(action: &str) -> Markup {
    html! {
        input type="hidden" name="action" value=(action);
    }
}

fn transaction_form(categories: &[String]) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::ADD_VIEW)
            id="add-transaction-form"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold" { "New Transaction" }

            (action_input("add_transaction"))

            div
            {
                (label("type", "Type"))

                select name="type" id="type" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="expense" { "Expense" }
                    option value="income" { "Income" }
                }
            }

            div
            {
                (label("amount", "Amount"))

                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                (label("description", "Description"))

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                (label("payment_method", "Payment Method"))

                select name="payment_method" id="payment_method" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for method in PAYMENT_METHODS {
                        option value=(method) { (method) }
                    }
                }
            }

            div
            {
                (label("category", "Category"))

                input
                    name="category"
                    id="category"
                    type="text"
                    list="category-options"
                    placeholder="Category"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                datalist id="category-options"
                {
                    @for category in categories {
                        option value=(category) {}
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
        }
    }
}

fn income_form() -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::ADD_VIEW)
            id="add-income-form"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold" { "Fixed Income" }

            (action_input("add_income"))

            div
            {
                (label("income_value", "Monthly Income"))

                input
                    name="income_value"
                    id="income_value"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Income" }
        }
    }
}

fn card_form(cards: &[Card]) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::ADD_VIEW)
            id="add-card-form"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold" { "Credit Card" }

            (action_input("add_card"))

            div
            {
                (label("card_name", "Card Name"))

                input
                    name="card_name"
                    id="card_name"
                    type="text"
                    placeholder="Card name"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                (label("card_due_day", "Due Day"))

                input
                    name="card_due_day"
                    id="card_due_day"
                    type="number"
                    min=(DueDay::MIN)
                    max=(DueDay::MAX)
                    step="1"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Card" }
        }

        @if !cards.is_empty() {
            ul id="cards" class="w-full mt-4 space-y-1 text-sm"
            {
                @for card in cards {
                    li { (card.name) " (due on day " (card.due_day) ")" }
                }
            }
        }
    }
}

fn add_view(categories: &[String], cards: &[Card], flash: Option<&Flash>) -> Markup {
    let nav_bar = NavBar::new(endpoints::ADD_VIEW).into_html();

    let content = html! {
        (nav_bar)
        (flash_view(flash))

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="grid w-full gap-6 lg:grid-cols-3"
            {
                div class=(FORM_CONTAINER_STYLE) { (transaction_form(categories)) }
                div class=(FORM_CONTAINER_STYLE) { (income_form()) }
                div class=(FORM_CONTAINER_STYLE) { (card_form(cards)) }
            }
        }
    };

    base("Add", &[], &content)
}

/// Display the forms for adding a transaction, fixed income or a credit card.
pub async fn get_add_page(
    State(state): State<AddState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let (mut categories, cards) = {
        let connection = lock_connection(&state.db_connection)?;

        (
            get_categories(user_id, &connection)?,
            get_cards(user_id, &connection)?,
        )
    };

    if categories.is_empty() {
        categories = DEFAULT_CATEGORIES.map(str::to_owned).to_vec();
    }

    let (jar, flash) = take_flash(jar);

    Ok((jar, add_view(&categories, &cards, flash.as_ref())).into_response())
}
