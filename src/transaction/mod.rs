//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The JSON payload shared by the edit endpoint and the API
//! - Handlers for editing, deleting and clearing transactions

mod clear_endpoint;
mod core;
mod delete_endpoint;
mod edit_endpoint;
mod payload;

pub use clear_endpoint::clear_data_endpoint;
pub use core::{
    CREDIT_CARD_PAYMENT_METHOD, DEFAULT_CATEGORIES, PAYMENT_METHODS, Transaction,
    TransactionBuilder, TransactionId, TransactionType, create_transaction,
    create_transaction_table, get_categories, get_transaction_dates, get_transactions,
    get_transactions_in_range,
};
pub use delete_endpoint::delete_transaction_endpoint;
pub(crate) use delete_endpoint::delete_owned_transaction;
pub use edit_endpoint::edit_transaction_endpoint;
pub(crate) use edit_endpoint::edit_owned_transaction;
pub use payload::TransactionPayload;
