//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    add::{add_endpoint, get_add_page},
    api::{
        api_create_card, api_create_transaction, api_delete_transaction, api_list_cards,
        api_list_transactions, api_log_in, api_log_out, api_register, api_update_transaction,
    },
    auth::{
        auth_guard, auth_guard_api, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    reports::get_reports_page,
    transaction::{clear_data_endpoint, delete_transaction_endpoint, edit_transaction_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(
            endpoints::REGISTER_VIEW,
            get(get_register_page).post(register_user),
        )
        .route(endpoints::API_REGISTER, post(api_register))
        .route(endpoints::API_LOG_IN, post(api_log_in))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::ADD_VIEW, get(get_add_page).post(add_endpoint))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::CLEAR_DATA, post(clear_data_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // JSON routes answer 401 instead of redirecting to the log-in page.
    let protected_json_routes = Router::new()
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(endpoints::EDIT_TRANSACTION, post(edit_transaction_endpoint))
        .route(endpoints::API_LOG_OUT, post(api_log_out))
        .route(
            endpoints::API_TRANSACTIONS,
            get(api_list_transactions).post(api_create_transaction),
        )
        .route(
            endpoints::API_TRANSACTION,
            delete(api_delete_transaction).put(api_update_transaction),
        )
        .route(
            endpoints::API_CARDS,
            get(api_list_cards).post(api_create_card),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_api));

    protected_routes
        .merge(protected_json_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
