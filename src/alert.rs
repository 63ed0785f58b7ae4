//! Alert boxes for displaying success, warning and error messages to users.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertType {
    fn style(self) -> &'static str {
        // Styles adapted from https://flowbite.com/docs/components/alerts/
        match self {
            AlertType::Success => {
                "p-4 mb-4 text-sm rounded-lg text-green-800 bg-green-50 \
                dark:bg-gray-800 dark:text-green-400"
            }
            AlertType::Error => {
                "p-4 mb-4 text-sm rounded-lg text-red-800 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400"
            }
            AlertType::Warning => {
                "p-4 mb-4 text-sm rounded-lg text-yellow-800 bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300"
            }
            AlertType::Info => {
                "p-4 mb-4 text-sm rounded-lg text-blue-800 bg-blue-50 \
                dark:bg-gray-800 dark:text-blue-400"
            }
        }
    }
}

/// Render `message` in an alert box styled for `kind`.
pub fn alert(kind: AlertType, message: &str) -> Markup {
    html! {
        div class=(kind.style()) role="alert" data-alert-type=(format!("{kind:?}").to_lowercase())
        {
            (message)
        }
    }
}
