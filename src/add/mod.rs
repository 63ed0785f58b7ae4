//! The page and form endpoint for adding transactions, fixed income and credit cards.

mod endpoint;
mod page;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;

use crate::AppState;

pub use endpoint::add_endpoint;
pub use page::get_add_page;

/// The state needed for the add page and its form endpoint.
#[derive(Debug, Clone)]
pub struct AddState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing transactions and cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AddState> for Key {
    fn from_ref(state: &AddState) -> Self {
        state.cookie_key.clone()
    }
}
