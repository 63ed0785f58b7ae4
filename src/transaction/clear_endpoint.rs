use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::Response,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    AppState,
    auth::UserID,
    db::lock_connection,
    endpoints,
    flash::{Flash, redirect_with_flash},
    transaction::core::clear_transactions,
};

/// The state needed to delete all of a user's transactions.
#[derive(Debug, Clone)]
pub struct ClearDataState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ClearDataState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<ClearDataState> for Key {
    fn from_ref(state: &ClearDataState) -> Self {
        state.cookie_key.clone()
    }
}

/// Delete every transaction of the logged-in user and go back to the dashboard.
pub async fn clear_data_endpoint(
    State(state): State<ClearDataState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| clear_transactions(user_id, &connection));

    let flash = match result {
        Ok(rows_affected) => {
            tracing::info!("User {user_id} cleared {rows_affected} transactions");
            Flash::success(format!("{rows_affected} transactions removed."))
        }
        Err(error) => Flash::error(format!(
            "Could not clear your data: {}",
            error.client_message()
        )),
    };

    redirect_with_flash(jar, endpoints::DASHBOARD_VIEW, flash)
}
