//! Raw responses from the HTTP collaborator and normalization outcomes

use crate::error::TransportError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Request headers handed to the HTTP collaborator
pub type Headers = BTreeMap<String, String>;

/// What the HTTP collaborator returned for one request
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Decoded JSON body
    Json(Value),
    /// Body that has not been decoded (raw file contents)
    Text(String),
    /// Transport-level error sentinel
    Failure(TransportError),
}

impl RawResponse {
    /// Decode a text body as JSON.
    ///
    /// Text that is not valid JSON becomes a JSON string, which the
    /// normalizers treat as an unexpected shape rather than an error.
    pub fn decode(self) -> Self {
        match self {
            RawResponse::Text(text) => match serde_json::from_str(&text) {
                Ok(value) => RawResponse::Json(value),
                Err(_) => RawResponse::Json(Value::String(text)),
            },
            other => other,
        }
    }

    /// Whether this response is an error the host should see unmodified.
    ///
    /// Matches transport failures and forge payloads carrying a `message`.
    pub fn is_error(&self) -> bool {
        match self {
            RawResponse::Failure(_) => true,
            RawResponse::Json(Value::Object(map)) => map.contains_key("message"),
            _ => false,
        }
    }

    /// The forge's error message, when there is one
    pub fn error_message(&self) -> Option<String> {
        match self {
            RawResponse::Json(Value::Object(map)) => {
                map.get("message").and_then(Value::as_str).map(str::to_string)
            }
            RawResponse::Failure(err) => Some(
                err.payload()
                    .and_then(|p| p.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string()),
            ),
            _ => None,
        }
    }
}

/// A canonical record, or the raw error response it could not become
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    /// Successfully normalized record
    Canonical(T),
    /// Error response, returned exactly as received
    Passthrough(RawResponse),
}

impl<T> Normalized<T> {
    /// Whether this is an error passthrough
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Normalized::Passthrough(_))
    }

    /// Take the canonical record
    pub fn into_canonical(self) -> Option<T> {
        match self {
            Normalized::Canonical(value) => Some(value),
            Normalized::Passthrough(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_text() {
        let raw = RawResponse::Text(r#"[{"tag_name":"v1"}]"#.to_string()).decode();
        assert_eq!(raw, RawResponse::Json(json!([{"tag_name": "v1"}])));
    }

    #[test]
    fn test_decode_non_json_text_becomes_string() {
        let raw = RawResponse::Text(String::new()).decode();
        assert_eq!(raw, RawResponse::Json(Value::String(String::new())));
    }

    #[test]
    fn test_is_error_on_message_field() {
        assert!(RawResponse::Json(json!({"message": "Not Found"})).is_error());
        assert!(!RawResponse::Json(json!({"name": "widget"})).is_error());
        assert!(!RawResponse::Json(json!([])).is_error());
        assert!(!RawResponse::Text("message".to_string()).is_error());
    }

    #[test]
    fn test_is_error_on_failure() {
        let raw = RawResponse::Failure(TransportError::timeout("https://git.example.com"));
        assert!(raw.is_error());
        assert!(raw.error_message().unwrap().contains("timeout"));
    }

    #[test]
    fn test_error_message_prefers_forge_payload() {
        let raw = RawResponse::Failure(TransportError::Status {
            url: "u".to_string(),
            status: 403,
            payload: Some(json!({"message": "token does not have required scope"})),
        });
        assert_eq!(
            raw.error_message().as_deref(),
            Some("token does not have required scope")
        );
    }

    #[test]
    fn test_normalized_accessors() {
        let ok: Normalized<u32> = Normalized::Canonical(3);
        assert!(!ok.is_passthrough());
        assert_eq!(ok.into_canonical(), Some(3));

        let err: Normalized<u32> = Normalized::Passthrough(RawResponse::Json(json!({"message": "x"})));
        assert!(err.is_passthrough());
        assert!(err.into_canonical().is_none());
    }
}
