//! Carteira is a web app for tracking personal income, expenses and credit cards.
//!
//! This library serves HTML pages for the browser and a JSON API under `/api`
//! that share a single cookie-based authentication model.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod add;
mod aggregation;
mod alert;
mod api;
mod api_response;
mod app_state;
mod auth;
mod card;
mod config;
mod dashboard;
mod db;
mod endpoints;
mod flash;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod period;
mod reports;
mod routing;
mod transaction;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use card::{Card, DueDay, create_card};
pub use config::{Config, DatabaseLocation, normalize_database_url};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{Transaction, TransactionType, create_transaction};

use crate::{
    api_response::ApiResponse, html::error_view, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password did not match a registered user.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("Password is too weak: {0}")]
    TooWeak(String),

    /// The password and its confirmation were different.
    #[error("Passwords do not match.")]
    PasswordMismatch,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address.")]
    InvalidEmail(String),

    /// The username or email is already taken by another user.
    #[error("Username or email is already registered.")]
    DuplicateUser,

    /// A required field was missing or blank.
    #[error("The field \"{0}\" is required.")]
    MissingField(&'static str),

    /// The amount could not be parsed as a finite, non-negative number.
    #[error("The amount \"{0}\" must be a valid, non-negative number.")]
    InvalidAmount(String),

    /// The transaction type was neither "income" nor "expense".
    #[error("The transaction type \"{0}\" must be either \"income\" or \"expense\".")]
    InvalidTransactionType(String),

    /// The card due day was not an integer between 1 and 31.
    #[error("The due day \"{0}\" must be a whole number between 1 and 31.")]
    InvalidDueDay(String),

    /// The add form was submitted with a missing or unrecognised action.
    #[error("Unknown action \"{0}\".")]
    UnknownAction(String),

    /// A JSON request body could not be parsed.
    #[error("Invalid request body: {0}")]
    InvalidPayload(String),

    /// The requested resource belongs to another user.
    #[error("You are not allowed to access this resource.")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The database URL does not point to a SQLite database.
    #[error("unsupported database URL \"{0}\", only SQLite databases are supported")]
    UnsupportedDatabase(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("user.") =>
            {
                Error::DuplicateUser
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that describes this error to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::PasswordMismatch
            | Error::InvalidEmail(_)
            | Error::DuplicateUser
            | Error::MissingField(_)
            | Error::InvalidAmount(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidDueDay(_)
            | Error::UnknownAction(_)
            | Error::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_)
            | Error::UnsupportedDatabase(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show to the client.
    ///
    /// Internal errors are logged and replaced with a generic message.
    pub fn client_message(&self) -> String {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        }
    }

    /// Render the error as a JSON `{status, message}` body with the matching status code.
    pub fn into_json_response(self) -> Response {
        let status_code = self.status_code();
        let body: ApiResponse<()> = ApiResponse::error(self.client_message());

        (status_code, Json(body)).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                error_view(
                    "Forbidden",
                    "403",
                    "You do not have access to this page.",
                    "Check the link or log in with a different account.",
                ),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error if error.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
            error => (
                error.status_code(),
                error_view("Bad Request", "400", &error.to_string(), "Go back and try again."),
            )
                .into_response(),
        }
    }
}
