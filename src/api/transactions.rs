//! Listing, creating, updating and deleting transactions through the API.

use axum::{
    Extension,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    api::ApiState,
    api_response::ApiResponse,
    auth::UserID,
    db::lock_connection,
    transaction::{
        TransactionId, TransactionPayload, create_transaction, delete_owned_transaction,
        edit_owned_transaction, get_transactions,
    },
    validation::{parse_json, path_id},
};

/// List every transaction of the user, newest first.
pub async fn api_list_transactions(
    State(state): State<ApiState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| get_transactions(user_id, &connection));

    match result {
        Ok(transactions) => ApiResponse::success(format!("{} transactions.", transactions.len()))
            .with_data(transactions)
            .into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// Store a new transaction from a JSON body and respond with 201 and the stored transaction.
pub async fn api_create_transaction(
    State(state): State<ApiState>,
    Extension(user_id): Extension<UserID>,
    body: Bytes,
) -> Response {
    let result = parse_json::<TransactionPayload>(&body)
        .and_then(TransactionPayload::into_builder)
        .and_then(|builder| {
            let connection = lock_connection(&state.db_connection)?;
            create_transaction(user_id, builder, &connection)
        });

    match result {
        Ok(transaction) => {
            tracing::info!("User {user_id} added transaction {} through the API", transaction.id);
            ApiResponse::success("Transaction added successfully!")
                .with_data(transaction)
                .into_response_with(StatusCode::CREATED)
        }
        Err(error) => error.into_json_response(),
    }
}

/// Update only the fields given in the JSON body.
///
/// Ownership is checked before the body is read.
pub async fn api_update_transaction(
    State(state): State<ApiState>,
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
            parse_json::<TransactionPayload>(&body)?.merge(transaction)
        })
    });

    match result {
        Ok(transaction) => {
            tracing::info!("User {user_id} updated transaction {transaction_id} through the API");
            ApiResponse::success("Transaction updated successfully!")
                .with_data(transaction)
                .into_response()
        }
        Err(error) => error.into_json_response(),
    }
}

pub async fn api_delete_transaction(
    State(state): State<ApiState>,
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
            tracing::info!("User {user_id} deleted transaction {transaction_id} through the API");
            ApiResponse::<()>::success("Transaction deleted successfully!").into_response()
        }
        Err(error) => error.into_json_response(),
    }
}
