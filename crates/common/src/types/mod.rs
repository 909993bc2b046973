use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Health {
    pub status: &'static str,
}

/// JSON error body returned by the users API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub error_message: String,
}

impl ErrorMessage {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error_message: msg.into() }
    }

    /// Body used whenever a user id does not resolve to a stored record.
    pub fn user_not_found(id: impl std::fmt::Display) -> Self {
        Self::new(format!("user {id} was not found."))
    }
}
