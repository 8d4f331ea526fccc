//! Request shape checks performed before any rewriting.

use serde_json::Value;

use crate::types::{ChatRequest, MessageRole};
use crate::{Error, ErrorContext, Result};

fn invalid(msg: impl Into<String>, field_path: impl Into<String>) -> Error {
    Error::validation_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field_path)
            .with_source("request_validator"),
    )
}

/// Untyped checks on a raw request body.
pub(crate) fn validate_value(raw: &Value) -> Result<()> {
    let obj = raw
        .as_object()
        .ok_or_else(|| invalid("request body must be a JSON object", "$"))?;

    let messages = obj
        .get("messages")
        .ok_or_else(|| invalid("missing required field: messages", "messages"))?
        .as_array()
        .ok_or_else(|| invalid("messages must be a list", "messages"))?;

    for (i, msg) in messages.iter().enumerate() {
        let msg = msg
            .as_object()
            .ok_or_else(|| invalid(format!("message {} must be an object", i), format!("messages[{}]", i)))?;
        match msg.get("role") {
            None | Some(Value::Null) => {
                return Err(invalid(
                    format!("message {} is missing a role", i),
                    format!("messages[{}].role", i),
                ))
            }
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(invalid(
                    format!("message {} role must be a string", i),
                    format!("messages[{}].role", i),
                ))
            }
        }
    }
    Ok(())
}

/// Checks the type system cannot express.
pub(crate) fn validate_request(request: &ChatRequest) -> Result<()> {
    for (i, msg) in request.messages.iter().enumerate() {
        if let MessageRole::Other(role) = &msg.role {
            if role.trim().is_empty() {
                return Err(invalid(
                    format!("message {} has an empty role", i),
                    format!("messages[{}].role", i),
                ));
            }
        }
    }
    Ok(())
}

/// Deserialize a validated body, reporting shape errors as validation errors.
pub(crate) fn parse_request(raw: Value) -> Result<ChatRequest> {
    serde_json::from_value(raw).map_err(|e| {
        Error::validation_with_context(
            "malformed chat request",
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("request_validator"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use serde_json::json;

    fn field_path(err: &Error) -> Option<&str> {
        err.context().and_then(|c| c.field_path.as_deref())
    }

    #[test]
    fn test_valid_body() {
        let raw = json!({"model": "m", "messages": [{"role": "user", "content": "hi"}]});
        assert!(validate_value(&raw).is_ok());
    }

    #[test]
    fn test_messages_must_be_list() {
        let err = validate_value(&json!({"messages": "hi"})).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(field_path(&err), Some("messages"));

        let err = validate_value(&json!({"model": "m"})).unwrap_err();
        assert!(err.to_string().contains("missing required field"));
    }

    #[test]
    fn test_missing_role_reports_index() {
        let raw = json!({"messages": [{"role": "user", "content": "a"}, {"content": "b"}]});
        let err = validate_value(&raw).unwrap_err();
        assert_eq!(field_path(&err), Some("messages[1].role"));
    }

    #[test]
    fn test_non_object_message() {
        let err = validate_value(&json!({"messages": ["hi"]})).unwrap_err();
        assert_eq!(field_path(&err), Some("messages[0]"));
    }

    #[test]
    fn test_empty_role_rejected() {
        let mut msg = Message::user("x");
        msg.role = MessageRole::Other(String::new());
        let request = ChatRequest::new("m", vec![msg]);
        assert!(validate_request(&request).unwrap_err().is_client_error());
    }

    #[test]
    fn test_parse_error_is_validation() {
        let raw = json!({"messages": [{"role": "user", "content": 42}]});
        assert!(validate_value(&raw).is_ok());
        let err = parse_request(raw).unwrap_err();
        assert!(err.is_client_error());
    }
}
