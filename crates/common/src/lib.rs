//! Shared building blocks for the users workspace: response types and
//! logging setup used by both the HTTP server and the binary.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn error_message_uses_camel_case_key() {
        let body = serde_json::to_value(types::ErrorMessage::new("user 1 was not found.")).unwrap();
        assert_eq!(body, serde_json::json!({"errorMessage": "user 1 was not found."}));
    }
}
