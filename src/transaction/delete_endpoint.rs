use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_response::ApiResponse,
    auth::UserID,
    db::lock_connection,
    transaction::core::{TransactionId, delete_transaction, get_owned_transaction},
    validation::path_id,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the user's transactions, responds with JSON.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Response {
    let transaction_id = match path_id(path) {
        Ok(transaction_id) => transaction_id,
        Err(error) => return error.into_json_response(),
    };

    let result = lock_connection(&state.db_connection)
        .and_then(|connection| delete_owned_transaction(transaction_id, user_id, &connection));

    match result {
        Ok(()) => {
            tracing::info!("User {user_id} deleted transaction {transaction_id}");
            ApiResponse::<()>::success("Transaction deleted successfully!").into_response()
        }
        Err(error) => error.into_json_response(),
    }
}

/// Delete the transaction `transaction_id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the transaction does not exist,
/// - [Error::Forbidden] if it belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn delete_owned_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_owned_transaction(transaction_id, user_id, connection)?;

    match delete_transaction(transaction_id, connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}
