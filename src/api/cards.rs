use axum::{
    Extension,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    Error,
    api::ApiState,
    api_response::ApiResponse,
    auth::UserID,
    card::{DueDay, create_card, get_cards},
    db::lock_connection,
    validation::{NumberOrText, parse_json, required_field},
};

/// The JSON body for a new card.
///
/// `due_day` may be sent as a number or a numeric string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CardRequest {
    pub name: Option<String>,
    pub due_day: Option<NumberOrText>,
}

pub async fn api_list_cards(
    State(state): State<ApiState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| get_cards(user_id, &connection));

    match result {
        Ok(cards) => ApiResponse::success(format!("{} cards.", cards.len()))
            .with_data(cards)
            .into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// Store a new card and respond with 201 and the stored card.
pub async fn api_create_card(
    State(state): State<ApiState>,
    Extension(user_id): Extension<UserID>,
    body: Bytes,
) -> Response {
    let result = parse_json::<CardRequest>(&body).and_then(|request| {
        let name = required_field(request.name.as_deref(), "name")?;
        let due_day = request
            .due_day
            .as_ref()
            .ok_or(Error::MissingField("due_day"))
            .and_then(DueDay::from_json)?;

        let connection = lock_connection(&state.db_connection)?;
        create_card(user_id, name, due_day, &connection)
    });

    match result {
        Ok(card) => {
            tracing::info!("User {user_id} added card {} through the API", card.id);
            ApiResponse::success("Card added successfully!")
                .with_data(card)
                .into_response_with(StatusCode::CREATED)
        }
        Err(error) => error.into_json_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState, UserID,
        api_response::ApiResponse,
        build_router,
        card::{Card, DueDay, create_card, get_cards},
        endpoints,
        test_utils::{create_named_user, create_test_user, get_test_app_state, log_in_cookie},
    };

    fn get_test_server() -> (TestServer, AppState, UserID) {
        let state = get_test_app_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        (server, state, user.id)
    }

    #[tokio::test]
    async fn creates_card_with_numeric_or_text_due_day() {
        let (server, state, user_id) = get_test_server();

        for (name, due_day) in [("Nubank", json!(5)), ("Itau", json!("31"))] {
            let response = server
                .post(endpoints::API_CARDS)
                .add_cookie(log_in_cookie(user_id))
                .json(&json!({"name": name, "due_day": due_day}))
                .await;

            response.assert_status(StatusCode::CREATED);
        }

        let cards = get_cards(user_id, &state.db_connection.lock().unwrap()).unwrap();
        let got: Vec<(&str, u8)> = cards
            .iter()
            .map(|card| (card.name.as_str(), card.due_day.get()))
            .collect();
        assert_eq!(got, vec![("Nubank", 5), ("Itau", 31)]);
    }

    #[tokio::test]
    async fn rejects_invalid_cards() {
        let (server, state, user_id) = get_test_server();

        for body in [
            json!({"due_day": 5}),
            json!({"name": "  ", "due_day": 5}),
            json!({"name": "Nubank"}),
            json!({"name": "Nubank", "due_day": 0}),
            json!({"name": "Nubank", "due_day": 32}),
            json!({"name": "Nubank", "due_day": 4.5}),
            json!({"name": "Nubank", "due_day": "fifth"}),
        ] {
            let response = server
                .post(endpoints::API_CARDS)
                .add_cookie(log_in_cookie(user_id))
                .json(&body)
                .await;

            response.assert_status_bad_request();
        }

        assert!(
            get_cards(user_id, &state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn lists_only_own_cards() {
        let (server, state, user_id) = get_test_server();
        let card = {
            let connection = state.db_connection.lock().unwrap();
            let other = create_named_user("other", "other@example.com", &connection);
            create_card(other.id, "Inter", DueDay::new(1).unwrap(), &connection).unwrap();
            create_card(user_id, "Nubank", DueDay::new(10).unwrap(), &connection).unwrap()
        };

        let response = server
            .get(endpoints::API_CARDS)
            .add_cookie(log_in_cookie(user_id))
            .await;

        response.assert_status_ok();
        let body: ApiResponse<Vec<Card>> = response.json();
        assert_eq!(body.data, Some(vec![card]));
    }
}
