//! Registration, log-in and log-out for API clients.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    Error,
    api_response::ApiResponse,
    auth::{
        Email, LoginState, REMEMBER_ME_COOKIE_DURATION, Registration, RegistrationState, User,
        UserID, authenticate, invalidate_auth_cookie, set_auth_cookie,
    },
    db::lock_connection,
    validation::{parse_json, required_field},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Checked against `password` only when given.
    pub confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// The public details of a user, never including the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserID,
    pub username: String,
    pub email: Email,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Create a new account from a JSON body.
///
/// Responds with 201 and the new user, or 400 if the details are missing, invalid or taken.
pub async fn api_register(State(state): State<RegistrationState>, body: Bytes) -> Response {
    let result = parse_json::<RegisterRequest>(&body)
        .and_then(|request| {
            Registration::new(
                &request.username,
                &request.email,
                &request.password,
                request.confirm_password.as_deref(),
            )
        })
        .and_then(|registration| registration.save(&state.db_connection));

    match result {
        Ok(user) => {
            tracing::info!("Registered user {} through the API", user.id);
            ApiResponse::success("User registered successfully!")
                .with_data(UserSummary::from(user))
                .into_response_with(StatusCode::CREATED)
        }
        Err(error) => error.into_json_response(),
    }
}

fn check_credentials(state: &LoginState, body: &[u8]) -> Result<(User, Duration), Error> {
    let request: LogInRequest = parse_json(body)?;
    let email = required_field(Some(&request.email), "email")?;

    if request.password.is_empty() {
        return Err(Error::MissingField("password"));
    }

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        authenticate(email, &request.password, &connection)?
    };

    let cookie_duration = if request.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    Ok((user, cookie_duration))
}

/// Log in with a JSON body and set the auth cookie.
///
/// Responds with 400 if the email or password is missing and 401 if they do not match a user.
pub async fn api_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    body: Bytes,
) -> Response {
    let result = check_credentials(&state, &body).and_then(|(user, cookie_duration)| {
        let jar = set_auth_cookie(jar, user.id, cookie_duration)?;
        Ok((jar, user))
    });

    match result {
        Ok((jar, user)) => {
            tracing::info!("User {} logged in through the API", user.id);
            let body = ApiResponse::success("Logged in successfully!").with_data(UserSummary::from(user));
            (jar, body).into_response()
        }
        Err(error) => {
            tracing::debug!("Rejected API log-in: {error}");
            error.into_json_response()
        }
    }
}

/// Invalidate the auth cookie.
pub async fn api_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, ApiResponse::<()>::success("You have been logged out.")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState,
        api_response::{ApiResponse, ApiStatus},
        build_router, endpoints,
        test_utils::{TEST_PASSWORD, create_test_user, get_test_app_state, log_in_cookie},
    };

    use super::UserSummary;

    fn get_test_server() -> (TestServer, AppState) {
        let state = get_test_app_state();
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    #[tokio::test]
    async fn register_creates_user() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::API_REGISTER)
            .json(&json!({
                "username": "maria",
                "email": "maria@example.com",
                "password": "a long and unusual passphrase",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<UserSummary> = response.json();
        assert_eq!(body.status, ApiStatus::Success);
        let user = body.data.expect("the new user should be returned");
        assert_eq!(user.username, "maria");
        assert_eq!(user.email.as_str(), "maria@example.com");
    }

    #[tokio::test]
    async fn register_rejects_bad_details() {
        let (server, state) = get_test_server();
        create_test_user(&state.db_connection.lock().unwrap());

        let bodies = [
            json!({"email": "maria@example.com", "password": "a long and unusual passphrase"}),
            json!({"username": "maria", "email": "not an email", "password": "a long and unusual passphrase"}),
            json!({"username": "maria", "email": "maria@example.com", "password": "password"}),
            json!({"username": "test", "email": "other@example.com", "password": "a long and unusual passphrase"}),
            json!({"username": "maria", "email": "test@example.com", "password": "a long and unusual passphrase"}),
            json!(["maria"]),
        ];

        for body in bodies {
            let response = server.post(endpoints::API_REGISTER).json(&body).await;

            response.assert_status_bad_request();
            let body: ApiResponse<()> = response.json();
            assert_eq!(body.status, ApiStatus::Error);
        }
    }

    #[tokio::test]
    async fn log_in_sets_auth_cookie() {
        let (server, state) = get_test_server();
        let user = create_test_user(&state.db_connection.lock().unwrap());

        let response = server
            .post(endpoints::API_LOG_IN)
            .json(&json!({"email": "test@example.com", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        response.cookie("token");
        let body: ApiResponse<UserSummary> = response.json();
        assert_eq!(body.data.map(|summary| summary.id), Some(user.id));
    }

    #[tokio::test]
    async fn log_in_with_missing_fields_is_bad_request() {
        let (server, _) = get_test_server();

        for body in [
            json!({"password": TEST_PASSWORD}),
            json!({"email": "test@example.com"}),
            json!({}),
        ] {
            let response = server.post(endpoints::API_LOG_IN).json(&body).await;

            response.assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn log_in_with_wrong_credentials_is_unauthorized() {
        let (server, state) = get_test_server();
        create_test_user(&state.db_connection.lock().unwrap());

        for body in [
            json!({"email": "test@example.com", "password": "wrong password"}),
            json!({"email": "nobody@example.com", "password": TEST_PASSWORD}),
        ] {
            let response = server.post(endpoints::API_LOG_IN).json(&body).await;

            response.assert_status_unauthorized();
            let body: ApiResponse<()> = response.json();
            assert_eq!(body.message, "Invalid email or password.");
        }
    }

    #[tokio::test]
    async fn log_out_expires_auth_cookie() {
        let (server, state) = get_test_server();
        let user = create_test_user(&state.db_connection.lock().unwrap());

        let response = server
            .post(endpoints::API_LOG_OUT)
            .add_cookie(log_in_cookie(user.id))
            .await;

        response.assert_status_ok();
        let cookie = response.cookie("token");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[tokio::test]
    async fn log_out_requires_auth() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::API_LOG_OUT)
            .await
            .assert_status_unauthorized();
    }
}
