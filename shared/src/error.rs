//! Backend error payload
//!
//! Non-2xx responses carry a JSON body whose fields are all optional.
//! Bean-validation failures arrive as `errors[].defaultMessage`.

use serde::{Deserialize, Serialize};

/// Error body returned by the pharmacy API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// Single field-level validation failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub default_message: Option<String>,
}

impl ApiErrorBody {
    /// Parse a response body, tolerating empty or non-JSON text.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// `message` if present and non-blank
    pub fn message(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }

    /// `error` if present and non-blank
    pub fn error(&self) -> Option<&str> {
        non_blank(self.error.as_deref())
    }

    /// Field validation messages joined with ", ", if any
    pub fn validation_summary(&self) -> Option<String> {
        let messages: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|e| non_blank(e.default_message.as_deref()))
            .collect();
        if messages.is_empty() {
            None
        } else {
            Some(messages.join(", "))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message() {
        let body = ApiErrorBody::parse(r#"{"message":"Invalid credentials"}"#);
        assert_eq!(body.message(), Some("Invalid credentials"));
        assert_eq!(body.validation_summary(), None);
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        let body = ApiErrorBody::parse("<html>502 Bad Gateway</html>");
        assert_eq!(body.message(), None);
        assert_eq!(body.error(), None);
    }

    #[test]
    fn test_validation_summary() {
        let body = ApiErrorBody::parse(
            r#"{"errors":[{"field":"email","defaultMessage":"Email should be valid"},
                          {"field":"age","defaultMessage":"Age must be non-negative"}]}"#,
        );
        assert_eq!(
            body.validation_summary().as_deref(),
            Some("Email should be valid, Age must be non-negative")
        );
    }
}
