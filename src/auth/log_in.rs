//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        User,
        cookie::{get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie},
        email::Email,
        redirect::normalize_redirect_url,
        user::get_user_by_email,
    },
    endpoints,
    flash::{Flash, set_flash, take_flash},
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, base, log_in_register, password_input, text_input},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub(crate) const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The message shown when the email or password is wrong.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid email or password.";

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// Find the user registered with `raw_email` and check their password.
///
/// # Errors
///
/// Returns an [Error::InvalidCredentials] if the email is not registered or the
/// password is wrong, so that the client cannot tell which one it was.
/// Returns an [Error::HashingError] if the password hash could not be checked.
pub fn authenticate(raw_email: &str, password: &str, connection: &Connection) -> Result<User, Error> {
    let email = Email::new(raw_email).map_err(|_| Error::InvalidCredentials)?;
    let user = match get_user_by_email(&email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    match user.password_hash.verify(password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

#[derive(Default)]
struct LogInFormErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
}

fn log_in_form(email: &str, errors: LogInFormErrors, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_VIEW)
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (text_input("Email", "email", "email", email, errors.email))

            (password_input("Password", "password", 0, errors.password))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Register here"
                }
            }
        }
    }
}

fn log_in_page(form: &Markup, flash: Option<&Flash>) -> Markup {
    let content = log_in_register("Log in to your account", flash, form);
    base("Log In", &[], &content)
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
///
/// Users that are already logged in are sent to the dashboard.
pub async fn get_log_in_page(jar: PrivateCookieJar, Query(query): Query<RedirectQuery>) -> Response {
    if get_token_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    let (jar, flash) = take_flash(jar);
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = log_in_form("", LogInFormErrors::default(), redirect_url.as_deref());

    (jar, log_in_page(&form, flash.as_ref())).into_response()
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Default, Deserialize)]
pub struct LogInData {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie set and the client is redirected to the dashboard page
/// or the page they were trying to reach.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let email = user_data.email.trim();

    let render_error = |errors: LogInFormErrors| {
        log_in_page(&log_in_form(email, errors, redirect_url), None).into_response()
    };

    if email.is_empty() {
        return render_error(LogInFormErrors {
            email: Some("Please enter your email."),
            ..Default::default()
        });
    }

    if user_data.password.is_empty() {
        return render_error(LogInFormErrors {
            password: Some("Please enter your password."),
            ..Default::default()
        });
    }

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        authenticate(email, &user_data.password, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            return render_error(LogInFormErrors {
                password: Some(INVALID_CREDENTIALS_ERROR_MSG),
                ..Default::default()
            });
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(LogInFormErrors {
                password: Some("An internal error occurred. Please try again later."),
                ..Default::default()
            });
        }
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => {
            tracing::info!("User {} logged in", user.id);
            let updated_jar = set_flash(updated_jar, Flash::success("Logged in successfully!"));
            (updated_jar, Redirect::to(redirect_url)).into_response()
        }
        Err(err) => {
            tracing::error!("Error setting auth cookie: {err}");
            (
                invalidate_auth_cookie(jar),
                Redirect::to(endpoints::INTERNAL_ERROR_VIEW),
            )
                .into_response()
        }
    }
}
