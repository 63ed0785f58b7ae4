#![allow(missing_docs)]

pub(crate) mod fixtures;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use fixtures::{
    TEST_PASSWORD, create_named_user, create_test_user, get_test_app_state, log_in_cookie,
    test_cookie_key,
};
pub(crate) use form::{assert_form_input, assert_form_submit_button, must_get_form};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::assert_redirect;
