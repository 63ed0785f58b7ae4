//! One-shot feedback messages that survive a redirect.
//!
//! A flash is stored as JSON in an encrypted private cookie and removed by the
//! next page that renders it.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};

use crate::alert::AlertType;

const COOKIE_FLASH: &str = "flash";

/// A message to show the user on the next rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: AlertType,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertType::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertType::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: AlertType::Info,
            message: message.into(),
        }
    }
}

/// Store `flash` in the cookie jar, replacing any unread flash.
pub fn set_flash(jar: PrivateCookieJar, flash: Flash) -> PrivateCookieJar {
    match serde_json::to_string(&flash) {
        Ok(value) => jar.add(
            Cookie::build((COOKIE_FLASH, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        ),
        Err(error) => {
            tracing::error!("Could not serialize flash message {flash:?}: {error}");
            jar
        }
    }
}

/// Remove and return the flash message in `jar`, if any.
///
/// The returned jar must be included in the response for the removal to reach the client.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let flash = match serde_json::from_str(cookie.value_trimmed()) {
        Ok(flash) => Some(flash),
        Err(error) => {
            tracing::warn!("Discarding unreadable flash message: {error}");
            None
        }
    };

    (jar.remove(Cookie::build(COOKIE_FLASH).path("/")), flash)
}

/// Redirect to `url` with `flash` shown on the destination page.
pub fn redirect_with_flash(jar: PrivateCookieJar, url: &str, flash: Flash) -> Response {
    (set_flash(jar, flash), Redirect::to(url)).into_response()
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};

    use super::{COOKIE_FLASH, Flash, set_flash, take_flash};

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::from(&Sha512::digest(b"flash")))
    }

    #[test]
    fn take_returns_flash_once() {
        let jar = set_flash(get_jar(), Flash::success("Saved!"));

        let (jar, flash) = take_flash(jar);
        assert_eq!(flash, Some(Flash::success("Saved!")));

        let (_, flash) = take_flash(jar);
        assert_eq!(flash, None);
    }

    #[test]
    fn take_without_flash_returns_none() {
        let (jar, flash) = take_flash(get_jar());

        assert_eq!(flash, None);
        assert!(jar.get(COOKIE_FLASH).is_none());
    }

    #[test]
    fn new_flash_replaces_old_flash() {
        let jar = set_flash(get_jar(), Flash::success("first"));
        let jar = set_flash(jar, Flash::error("second"));

        let (_, flash) = take_flash(jar);

        assert_eq!(flash, Some(Flash::error("second")));
    }
}
