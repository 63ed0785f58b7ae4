use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    body::Bytes,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_response::ApiResponse,
    auth::UserID,
    db::lock_connection,
    transaction::{
        Transaction,
        core::{TransactionId, get_owned_transaction, update_transaction},
        payload::TransactionPayload,
    },
    validation::{parse_json, path_id},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Replace the fields of one of the user's transactions with the JSON body.
///
/// The body is only read once the user is known to own the transaction, so that
/// another user's transaction is always rejected with 403 whatever the body holds.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<TransactionId>, PathRejection>,
    body: Bytes,
) -> Response {
    let transaction_id = match path_id(path) {
        Ok(transaction_id) => transaction_id,
        Err(error) => return error.into_json_response(),
    };

    let result = lock_connection(&state.db_connection).and_then(|connection| {
        edit_owned_transaction(transaction_id, user_id, &connection, |transaction| {
            parse_json::<TransactionPayload>(&body)?.replace(transaction)
        })
    });

    match result {
        Ok(transaction) => {
            tracing::info!("User {user_id} edited transaction {transaction_id}");
            ApiResponse::success("Transaction updated successfully!")
                .with_data(transaction)
                .into_response()
        }
        Err(error) => error.into_json_response(),
    }
}

/// Check that `user_id` owns `transaction_id`, apply `edit` and store the result.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the transaction does not exist,
/// - [Error::Forbidden] if it belongs to another user,
/// - any error returned by `edit`, in which case nothing is written,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn edit_owned_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
    edit: impl FnOnce(&mut Transaction) -> Result<(), Error>,
) -> Result<Transaction, Error> {
    let mut transaction = get_owned_transaction(transaction_id, user_id, connection)?;

    edit(&mut transaction)?;
    update_transaction(&transaction, connection)?;

    Ok(transaction)
}
