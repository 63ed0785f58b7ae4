//! Dashboard module
//!
//! Provides the monthly overview page: totals, the credit card bill and the
//! month's transactions with controls for editing and deleting them.

mod cards;
mod handlers;
mod tables;

pub(crate) use cards::{month_filter, selectable_years, totals_cards};
pub use handlers::get_dashboard_page;
pub(crate) use tables::transactions_table;
