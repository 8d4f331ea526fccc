//! Removal of request parameters the backend rejects.

use serde_json::Value;
use tracing::debug;

use crate::types::ChatRequest;

/// Drop `unsupported` top-level fields and the `function.strict` flag of every
/// object tool entry. Other tool entries and keys are left as they are.
pub(crate) fn strip_unsupported(request: &mut ChatRequest, unsupported: &[String]) {
    for param in unsupported {
        if request.extra.remove(param).is_some() {
            debug!(param = %param, "removed unsupported parameter");
        }
    }

    if let Some(Value::Array(tools)) = request.extra.get_mut("tools") {
        let mut stripped = 0;
        for function in tools
            .iter_mut()
            .filter_map(|tool| tool.get_mut("function").and_then(Value::as_object_mut))
        {
            if function.remove("strict").is_some() {
                stripped += 1;
            }
        }
        if stripped > 0 {
            debug!(count = stripped, "removed strict flag from tool definitions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use serde_json::json;

    fn unsupported() -> Vec<String> {
        vec!["parallel_tool_calls".to_string(), "reasoning_effort".to_string()]
    }

    #[test]
    fn test_strip_params_and_strict() {
        let mut request = ChatRequest::new("m", vec![Message::user("hi")])
            .with_tools(vec![json!({
                "type": "function",
                "function": {"name": "f", "strict": true, "parameters": {"type": "object"}}
            })])
            .with_extra("parallel_tool_calls", json!(false))
            .with_extra("reasoning_effort", json!("high"))
            .with_extra("temperature", json!(0.3));

        strip_unsupported(&mut request, &unsupported());

        assert!(!request.extra.contains_key("parallel_tool_calls"));
        assert!(!request.extra.contains_key("reasoning_effort"));
        assert_eq!(request.extra["temperature"], 0.3);

        let tools = &request.extra["tools"];
        assert!(tools[0]["function"].get("strict").is_none());
        assert_eq!(tools[0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_non_function_tools_and_siblings_survive() {
        let tools = vec![
            json!({"type": "web_search"}),
            json!({
                "type": "function",
                "function": {"name": "f", "strict": false},
                "cache_control": {"type": "ephemeral"}
            }),
            json!({"type": "function", "function": "not-an-object"}),
            json!("bare"),
        ];
        let mut request = ChatRequest::new("m", vec![Message::user("hi")]).with_tools(tools);

        strip_unsupported(&mut request, &unsupported());

        assert_eq!(
            request.extra["tools"],
            json!([
                {"type": "web_search"},
                {"type": "function", "function": {"name": "f"}, "cache_control": {"type": "ephemeral"}},
                {"type": "function", "function": "not-an-object"},
                "bare"
            ])
        );
    }
}
