//! The monthly reports page with category and daily trend charts.

mod charts;
mod handlers;

pub use handlers::get_reports_page;
