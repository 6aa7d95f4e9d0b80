use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the storefront API.
///
/// The API answers with one of three shapes: `{"detail": "..."}`,
/// `{"error": "..."}`, or a map of field names to lists of messages
/// (`{"password": ["Password fields didn't match."]}`). The raw JSON is kept
/// verbatim so callers can show field errors next to the matching input.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ErrorResponse(pub Value);

impl ErrorResponse {
    /// Parse a response body, falling back to a plain string for non-JSON bodies.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).map_or_else(|_| Self(Value::String(body.to_string())), Self)
    }

    /// The `detail` or `error` message, if the body carries one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.0 {
            Value::String(text) if !text.is_empty() => Some(text),
            Value::Object(map) => map
                .get("detail")
                .or_else(|| map.get("error"))
                .and_then(Value::as_str),
            _ => None,
        }
    }

    /// Messages attached to a single field.
    #[must_use]
    pub fn field(&self, name: &str) -> Vec<String> {
        match self.0.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(text)) => vec![text.clone()],
            _ => Vec::new(),
        }
    }

    /// `true` when the body is a field-error map rather than a single message.
    #[must_use]
    pub fn has_field_errors(&self) -> bool {
        match &self.0 {
            Value::Object(map) => map
                .keys()
                .any(|key| key != "detail" && key != "error" && key != "code"),
            _ => false,
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(message) = self.message() {
            return f.write_str(message);
        }
        match &self.0 {
            Value::Object(map) => {
                let mut first = true;
                for (field, messages) in map {
                    if !first {
                        f.write_str("; ")?;
                    }
                    first = false;
                    match messages {
                        Value::Array(items) => {
                            let joined = items
                                .iter()
                                .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
                                .collect::<Vec<_>>()
                                .join(" ");
                            write!(f, "{field}: {joined}")?;
                        }
                        Value::String(text) => write!(f, "{field}: {text}")?,
                        other => write!(f, "{field}: {other}")?,
                    }
                }
                Ok(())
            }
            Value::Null => f.write_str("empty response body"),
            other => write!(f, "{other}"),
        }
    }
}
