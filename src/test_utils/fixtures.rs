use axum::{http::header::SET_COOKIE, response::IntoResponse};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};
use rusqlite::Connection;

use crate::{
    AppState, PasswordHash, ValidatedPassword,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, Email, User, UserID, create_user, set_auth_cookie},
};

const TEST_COOKIE_SECRET: &str = "foobar";

/// The password of the users created by [create_test_user].
pub(crate) const TEST_PASSWORD: &str = "correct horse battery staple";

pub(crate) fn test_cookie_key() -> Key {
    create_cookie_key(TEST_COOKIE_SECRET)
}

/// An app state backed by a fresh in-memory database.
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, TEST_COOKIE_SECRET).expect("Could not create app state")
}

/// Create the user "test" with the email "test@example.com" and [TEST_PASSWORD].
pub(crate) fn create_test_user(connection: &Connection) -> User {
    create_named_user("test", "test@example.com", connection)
}

pub(crate) fn create_named_user(username: &str, email: &str, connection: &Connection) -> User {
    // A low cost keeps the tests fast.
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
        .expect("Could not hash password");

    create_user(
        username,
        Email::new(email).expect("Invalid test email"),
        password_hash,
        connection,
    )
    .expect("Could not create test user")
}

/// The encrypted auth cookie a browser would hold after `user_id` logged in.
pub(crate) fn log_in_cookie(user_id: UserID) -> Cookie<'static> {
    let jar = set_auth_cookie(
        PrivateCookieJar::new(test_cookie_key()),
        user_id,
        DEFAULT_COOKIE_DURATION,
    )
    .expect("Could not set auth cookie");
    let response = jar.into_response();
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("No cookie was set")
        .to_str()
        .expect("Cookie header is not a string");

    Cookie::parse(header.to_owned()).expect("Could not parse cookie")
}
