// Typed errors with thiserror. Messages are shown to the user verbatim as blocking notices.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Seating engine error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeatingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("You can only select up to {max} tickets. Change the ticket count to select more.")]
    CapacityExceeded { max: u32 },

    #[error("Please select at least one seat!")]
    EmptySelection,

    #[error("Invalid seat list: {0}")]
    InvalidSeatList(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SeatingError {
    fn from(err: serde_json::Error) -> Self {
        SeatingError::Serialization(err.to_string())
    }
}

impl From<SeatingError> for JsValue {
    fn from(err: SeatingError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
