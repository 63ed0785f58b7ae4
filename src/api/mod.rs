//! The JSON API under `/api`.
//!
//! Every handler answers with an [ApiResponse](crate::api_response::ApiResponse) body,
//! including on errors, so API clients never have to parse HTML.
//! Authentication uses the same cookie as the HTML pages.

mod auth;
mod cards;
mod transactions;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use auth::{api_log_in, api_log_out, api_register};
pub use cards::{api_create_card, api_list_cards};
pub use transactions::{
    api_create_transaction, api_delete_transaction, api_list_transactions, api_update_transaction,
};

/// The state needed by the transaction and card API routes.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
