//! User accounts, password handling and cookie-based authentication.

mod cookie;
mod email;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use email::Email;
pub use log_in::{LoginState, authenticate, get_log_in_page, post_log_in};
pub(crate) use log_in::REMEMBER_ME_COOKIE_DURATION;
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_api};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{Registration, RegistrationState, get_register_page, register_user};
pub use user::{User, UserID, create_user, create_user_table};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
