//! The endpoint URIs for the HTML pages and the JSON API.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page with the forms for adding transactions, fixed income and cards.
pub const ADD_VIEW: &str = "/add";
/// The page with the monthly charts.
pub const REPORTS_VIEW: &str = "/reports";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for logging out the current user.
pub const LOG_OUT: &str = "/logout";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for deleting a single transaction, answers with JSON.
pub const DELETE_TRANSACTION: &str = "/delete_transaction/{transaction_id}";
/// The route for replacing the fields of a single transaction, answers with JSON.
pub const EDIT_TRANSACTION: &str = "/edit_transaction/{transaction_id}";
/// The route for deleting all of the user's transactions.
pub const CLEAR_DATA: &str = "/clear_data";

/// The route for registering a user through the API.
pub const API_REGISTER: &str = "/api/register";
/// The route for logging in through the API.
pub const API_LOG_IN: &str = "/api/login";
/// The route for logging out through the API.
pub const API_LOG_OUT: &str = "/api/logout";
/// The route to list and create transactions.
pub const API_TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const API_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list and create cards.
pub const API_CARDS: &str = "/api/cards";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
