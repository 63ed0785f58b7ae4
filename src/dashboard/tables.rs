//! The table listing a month's transactions.

use maud::{Markup, html};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_EDIT_STYLE, BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency,
    },
    transaction::{PAYMENT_METHODS, Transaction, TransactionType},
};

fn format_date(date: OffsetDateTime) -> String {
    date.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| date.date().to_string())
}

fn type_label(type_: TransactionType) -> &'static str {
    match type_ {
        TransactionType::Income => "Income",
        TransactionType::Expense => "Expense",
    }
}

fn amount_cell(transaction: &Transaction) -> Markup {
    let color = match transaction.type_ {
        TransactionType::Income => "text-green-600 dark:text-green-400",
        TransactionType::Expense => "text-red-600 dark:text-red-400",
    };

    html! {
        td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap " (color)}
        {
            (format_currency(transaction.signed_amount()))
        }
    }
}

/// The inline form for editing a transaction, hidden until its edit button is clicked.
///
/// `static/app.js` submits it as JSON to the edit endpoint.
fn edit_row(transaction: &Transaction) -> Markup {
    let endpoint = format_endpoint(endpoints::EDIT_TRANSACTION, transaction.id);
    let form_id = format!("edit-transaction-{}", transaction.id);

    html! {
        tr id={(form_id) "-row"} class={(TABLE_ROW_STYLE) " hidden"}
        {
            td colspan="7" class=(TABLE_CELL_STYLE)
            {
                form
                    id=(form_id)
                    class="edit-transaction-form grid grid-cols-1 md:grid-cols-6 gap-2"
                    data-endpoint=(endpoint)
                {
                    select name="type" class=(FORM_TEXT_INPUT_STYLE) aria-label="Type"
                    {
                        @for type_ in [TransactionType::Expense, TransactionType::Income] {
                            option value=(type_) selected[type_ == transaction.type_] { (type_label(type_)) }
                        }
                    }

                    input
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        required
                        aria-label="Amount"
                        value=(transaction.amount)
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="text"
                        name="description"
                        aria-label="Description"
                        value=(transaction.description.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);

                    select name="payment_method" class=(FORM_TEXT_INPUT_STYLE) aria-label="Payment Method"
                    {
                        @for method in PAYMENT_METHODS {
                            option
                                value=(method)
                                selected[transaction.payment_method.as_deref() == Some(method)]
                            {
                                (method)
                            }
                        }
                    }

                    input
                        type="text"
                        name="category"
                        aria-label="Category"
                        value=(transaction.category.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }
            }
        }
    }
}

/// Renders the transactions as a table, newest first as given.
///
/// When `editable` is set each row gets edit and delete controls.
pub(crate) fn transactions_table(transactions: &[Transaction], editable: bool) -> Markup {
    if transactions.is_empty() {
        return html! {
            p id="no-transactions" class="text-gray-600 dark:text-gray-400"
            {
                "No transactions for this month."
            }
        };
    }

    html! {
        div class="w-full overflow-x-auto rounded-lg shadow"
        {
            table id="transactions" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Payment Method" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }

                        @if editable {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                        {
                            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} { (format_date(transaction.date)) }
                            td class=(TABLE_CELL_STYLE) { (type_label(transaction.type_)) }
                            td class=(TABLE_CELL_STYLE) { (transaction.description.as_deref().unwrap_or_default()) }
                            td class=(TABLE_CELL_STYLE) { (transaction.category.as_deref().unwrap_or_default()) }
                            td class=(TABLE_CELL_STYLE) { (transaction.payment_method.as_deref().unwrap_or_default()) }
                            (amount_cell(transaction))

                            @if editable {
                                td class={(TABLE_CELL_STYLE) " space-x-2 whitespace-nowrap"}
                                {
                                    button
                                        type="button"
                                        class={"edit-transaction " (BUTTON_EDIT_STYLE)}
                                        data-form-id=(format!("edit-transaction-{}", transaction.id))
                                    {
                                        "Edit"
                                    }

                                    button
                                        type="button"
                                        class={"delete-transaction " (BUTTON_DELETE_STYLE)}
                                        data-endpoint=(format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id))
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }

                        @if editable {
                            (edit_row(transaction))
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        UserID,
        transaction::{Transaction, TransactionType},
    };

    use super::transactions_table;

    fn sample() -> Vec<Transaction> {
        vec![Transaction {
            id: 7,
            user_id: UserID::new(1),
            type_: TransactionType::Expense,
            amount: 12.5,
            description: Some("Lunch".to_owned()),
            payment_method: Some("Cartao de Credito".to_owned()),
            category: Some("Food".to_owned()),
            date: datetime!(2025-03-09 12:00 UTC),
        }]
    }

    fn parse(editable: bool) -> Html {
        Html::parse_document(&format!(
            "<!DOCTYPE html><html><body>{}</body></html>",
            transactions_table(&sample(), editable).into_string()
        ))
    }

    #[test]
    fn renders_row_values() {
        let html = parse(false);

        let cells = Selector::parse("tr[data-transaction-id='7'] td").unwrap();
        let text: Vec<String> = html.select(&cells).map(|cell| cell.text().collect()).collect();
        assert_eq!(
            text,
            vec!["09/03/2025", "Expense", "Lunch", "Food", "Cartao de Credito", "-R$12.50"]
        );
    }

    #[test]
    fn editable_table_has_controls() {
        let html = parse(true);

        let delete = Selector::parse("button.delete-transaction").unwrap();
        let delete = html.select(&delete).next().expect("No delete button");
        assert_eq!(delete.value().attr("data-endpoint"), Some("/delete_transaction/7"));

        let form = Selector::parse("form.edit-transaction-form").unwrap();
        let form = html.select(&form).next().expect("No edit form");
        assert_eq!(form.value().attr("data-endpoint"), Some("/edit_transaction/7"));

        let selected = Selector::parse("option[selected]").unwrap();
        let selected: Vec<_> = form
            .select(&selected)
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(selected, vec!["expense", "Cartao de Credito"]);
    }

    #[test]
    fn read_only_table_has_no_controls() {
        let html = parse(false);

        let buttons = Selector::parse("button").unwrap();
        assert_eq!(html.select(&buttons).count(), 0);
    }

    #[test]
    fn empty_month_shows_message() {
        let html = Html::parse_fragment(&transactions_table(&[], true).into_string());

        let message = Selector::parse("#no-transactions").unwrap();
        assert_eq!(html.select(&message).count(), 1);
    }
}
