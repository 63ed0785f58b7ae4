//! The registration page and the shared logic for creating new user accounts.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{User, cookie::get_token_from_cookies, email::Email, user::create_user},
    db::lock_connection,
    endpoints,
    flash::{Flash, redirect_with_flash, take_flash},
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, base, log_in_register, password_input, text_input},
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

/// The validated details of a new user account, ready to be hashed and stored.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: Email,
    pub password: ValidatedPassword,
}

impl Registration {
    /// Validate the details entered for a new account.
    ///
    /// `confirm_password` is checked against `password` when given.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checked in this order:
    /// - [Error::MissingField] for a blank field,
    /// - [Error::InvalidEmail] if the email is malformed,
    /// - [Error::PasswordMismatch] if the confirmation differs,
    /// - [Error::TooWeak] if the password is easy to guess.
    pub fn new(
        username: &str,
        email: &str,
        password: &str,
        confirm_password: Option<&str>,
    ) -> Result<Self, Error> {
        let username = username.trim();

        if username.is_empty() {
            return Err(Error::MissingField("username"));
        }
        if email.trim().is_empty() {
            return Err(Error::MissingField("email"));
        }
        if password.is_empty() {
            return Err(Error::MissingField("password"));
        }
        if confirm_password.is_some_and(str::is_empty) {
            return Err(Error::MissingField("confirm_password"));
        }

        let email = Email::new(email)?;

        if confirm_password.is_some_and(|confirm_password| confirm_password != password) {
            return Err(Error::PasswordMismatch);
        }

        let password = ValidatedPassword::new(password, &[username, email.as_str()])?;

        Ok(Self {
            username: username.to_owned(),
            email,
            password,
        })
    }

    /// Hash the password and insert the new user.
    ///
    /// The password is hashed before the database lock is taken.
    ///
    /// # Errors
    ///
    /// Returns an [Error::DuplicateUser] if the username or email is taken,
    /// an [Error::HashingError] if the password could not be hashed,
    /// or an [Error::DatabaseLockError] if the lock is poisoned.
    pub fn save(self, db_connection: &Mutex<Connection>) -> Result<User, Error> {
        let password_hash = PasswordHash::new(self.password, PasswordHash::DEFAULT_COST)?;
        let connection = lock_connection(db_connection)?;

        create_user(&self.username, self.email, password_hash, &connection)
    }
}

#[derive(Default)]
struct RegistrationFormErrors {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl RegistrationFormErrors {
    fn from_error(error: &Error) -> Self {
        let message = Some(error.client_message());

        match error {
            Error::MissingField("username") | Error::DuplicateUser => Self {
                username: message,
                ..Default::default()
            },
            Error::MissingField("email") | Error::InvalidEmail(_) => Self {
                email: message,
                ..Default::default()
            },
            Error::MissingField("confirm_password") | Error::PasswordMismatch => Self {
                confirm_password: message,
                ..Default::default()
            },
            _ => Self {
                password: message,
                ..Default::default()
            },
        }
    }
}

fn registration_form(username: &str, email: &str, errors: &RegistrationFormErrors) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::REGISTER_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (text_input("Username", "username", "text", username, errors.username.as_deref()))
            (text_input("Email", "email", "email", email, errors.email.as_deref()))
            (password_input("Password", "password", PASSWORD_INPUT_MIN_LENGTH, errors.password.as_deref()))
            (password_input(
                "Confirm Password",
                "confirm_password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.confirm_password.as_deref()
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

fn registration_page(form: &Markup, flash: Option<&Flash>) -> Markup {
    let content = log_in_register("Create an account", flash, form);
    base("Register", &[], &content)
}

/// Display the registration page.
///
/// Users that are already logged in are sent to the dashboard.
pub async fn get_register_page(jar: PrivateCookieJar) -> Response {
    if get_token_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    let (jar, flash) = take_flash(jar);
    let form = registration_form("", "", &RegistrationFormErrors::default());

    (jar, registration_page(&form, flash.as_ref())).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a new account from the registration form and send the user to the log-in page.
///
/// Validation errors are shown next to the offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let result = Registration::new(
        &user_data.username,
        &user_data.email,
        &user_data.password,
        Some(&user_data.confirm_password),
    )
    .and_then(|registration| registration.save(&state.db_connection));

    match result {
        Ok(user) => {
            tracing::info!("Registered user {}", user.id);
            redirect_with_flash(
                jar,
                endpoints::LOG_IN_VIEW,
                Flash::success("Registration successful! Please log in."),
            )
        }
        Err(error) if error.status_code().is_client_error() => {
            let form = registration_form(
                &user_data.username,
                &user_data.email,
                &RegistrationFormErrors::from_error(&error),
            );
            registration_page(&form, None).into_response()
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            error.into_response()
        }
    }
}
