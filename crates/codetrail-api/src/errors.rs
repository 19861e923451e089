use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("invalid_argument", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_set_the_wire_code() {
        assert_eq!(ApiError::invalid_argument("bad seed").code, "invalid_argument");
        assert_eq!(ApiError::not_found("no such node").code, "not_found");
    }

    #[test]
    fn serializes_code_and_message() {
        let error = ApiError::new("invalid_argument", "schema version 9");
        let json = serde_json::to_string(&error).expect("ApiError should serialize");
        assert_eq!(
            json,
            "{\"code\":\"invalid_argument\",\"message\":\"schema version 9\"}"
        );
    }
}
