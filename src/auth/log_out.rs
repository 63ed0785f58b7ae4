//! The route handler for logging out the current user.

use axum::response::Response;
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::invalidate_auth_cookie,
    endpoints,
    flash::{Flash, redirect_with_flash},
};

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    redirect_with_flash(
        jar,
        endpoints::LOG_IN_VIEW,
        Flash::info("You have been logged out."),
    )
}
