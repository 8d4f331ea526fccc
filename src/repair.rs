//! 消息修正：使消息序列满足混元的结构约束。
//!
//! Message sequence repair.
//!
//! The backend rejects conversations that
//! - end on an assistant message,
//! - have a tool message directly followed by a user message,
//! - carry a message with empty content.
//!
//! [`repair_messages`] rewrites a sequence so none of these hold. It builds a
//! new vector and never touches its input; the same input always yields the
//! same output.

use tracing::debug;

use crate::types::{Message, MessageContent, MessageRole};

pub const TOOL_CALL_PREFIX: &str = "will call tools: ";
pub const ASSISTANT_PLACEHOLDER: &str = "OK, working on it.";
pub const CONTINUE_PLACEHOLDER: &str = "Please continue.";
pub const SYSTEM_PLACEHOLDER: &str = "You are a helpful AI assistant.";
pub const TOOL_PLACEHOLDER: &str = "Tool execution completed.";
pub const OTHER_PLACEHOLDER: &str = "...";
pub const TRANSITION_PREFIX: &str = "Tool returned a result. ";

/// Tool output longer than this is cut and suffixed with `...`.
const SUMMARY_MAX_CHARS: usize = 200;
/// At most this much of the summary follows [`TRANSITION_PREFIX`].
const TRANSITION_MAX_CHARS: usize = 100;

/// Repair a message sequence. Empty input gives empty output; otherwise the
/// output is at least as long as the input.
pub fn repair_messages(messages: &[Message]) -> Vec<Message> {
    if messages.is_empty() {
        return Vec::new();
    }
    debug!(roles = ?roles(messages), "repairing message sequence");

    let mut repaired = Vec::with_capacity(messages.len() + 2);
    for (i, msg) in messages.iter().enumerate() {
        let fixed = ensure_content(msg);

        // Adjacency is judged on the input, not on what has been inserted.
        let followed_by_user = messages
            .get(i + 1)
            .is_some_and(|next| next.role == MessageRole::User);
        let transition = (fixed.role == MessageRole::Tool && followed_by_user)
            .then(|| transition_message(&fixed));

        repaired.push(fixed);
        if let Some(transition) = transition {
            debug!(index = i, "inserting assistant transition after tool message");
            repaired.push(transition);
        }
    }

    if repaired
        .last()
        .is_some_and(|last| last.role == MessageRole::Assistant)
    {
        debug!("appending user continuation after trailing assistant message");
        repaired.push(Message::user(CONTINUE_PLACEHOLDER));
    }

    debug!(roles = ?roles(&repaired), "repaired message sequence");
    repaired
}

/// Copy of `msg` whose content is guaranteed non-empty.
pub fn ensure_content(msg: &Message) -> Message {
    let mut fixed = msg.clone();
    if msg.has_empty_content() {
        let placeholder = placeholder_for(msg);
        debug!(role = %msg.role, "filling empty content");
        fixed.content = Some(MessageContent::Text(placeholder));
    }
    fixed
}

fn placeholder_for(msg: &Message) -> String {
    match msg.role {
        MessageRole::Assistant => match msg.tool_calls.as_deref() {
            Some(calls) if !calls.is_empty() => {
                let names: Vec<&str> = calls.iter().map(|call| call.name()).collect();
                format!("{}{}", TOOL_CALL_PREFIX, names.join(", "))
            }
            _ => ASSISTANT_PLACEHOLDER.to_string(),
        },
        MessageRole::User => CONTINUE_PLACEHOLDER.to_string(),
        MessageRole::System => SYSTEM_PLACEHOLDER.to_string(),
        MessageRole::Tool => TOOL_PLACEHOLDER.to_string(),
        MessageRole::Other(_) => OTHER_PLACEHOLDER.to_string(),
    }
}

/// Assistant message summarizing a tool result.
fn transition_message(tool: &Message) -> Message {
    let output = tool.text();
    let summary = if output.is_empty() {
        TOOL_PLACEHOLDER.to_string()
    } else if output.chars().count() > SUMMARY_MAX_CHARS {
        format!("{}...", truncate_chars(&output, SUMMARY_MAX_CHARS))
    } else {
        output
    };
    Message::assistant(format!(
        "{}{}",
        TRANSITION_PREFIX,
        truncate_chars(&summary, TRANSITION_MAX_CHARS)
    ))
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn roles(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.role.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentPart, ToolCall};
    use serde_json::json;

    fn role_list(messages: &[Message]) -> Vec<MessageRole> {
        messages.iter().map(|m| m.role.clone()).collect()
    }

    fn text(msg: &Message) -> &str {
        match msg.content.as_ref() {
            Some(MessageContent::Text(t)) => t,
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(repair_messages(&[]).is_empty());
    }

    #[test]
    fn test_tool_chain_then_user() {
        let input = vec![
            Message::user("weather in Paris?"),
            Message::empty(MessageRole::Assistant)
                .with_tool_calls(vec![ToolCall::new("x", json!({"city": "Paris"}))]),
            Message::tool("call_1", "sunny, 21C"),
            Message::user("thanks, and tomorrow?"),
        ];
        let out = repair_messages(&input);

        assert_eq!(out.len(), input.len() + 1);
        assert_eq!(
            role_list(&out),
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::Assistant,
                MessageRole::User,
            ]
        );
        assert_eq!(text(&out[1]), "will call tools: x");
        assert!(out[1].tool_calls.is_some(), "tool calls are kept");
        assert_eq!(text(&out[3]), "Tool returned a result. sunny, 21C");
        assert_eq!(out[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_multiple_tool_names_joined() {
        let input = vec![Message::empty(MessageRole::Assistant).with_tool_calls(vec![
            ToolCall::new("search", json!({})),
            ToolCall::new("fetch", json!({})),
        ])];
        let out = repair_messages(&input);
        assert_eq!(text(&out[0]), "will call tools: search, fetch");
        // trailing assistant gets a continuation
        assert_eq!(out.len(), 2);
        assert_eq!(text(&out[1]), CONTINUE_PLACEHOLDER);
    }

    #[test]
    fn test_placeholders_by_role() {
        let input = vec![
            Message::empty(MessageRole::System),
            Message::user("   "),
            Message::with_content(MessageRole::Tool, MessageContent::Parts(vec![])),
            Message::empty(MessageRole::Other("function".into())),
            Message::empty(MessageRole::Assistant),
            Message::user("go"),
        ];
        let out = repair_messages(&input);
        assert_eq!(text(&out[0]), SYSTEM_PLACEHOLDER);
        assert_eq!(text(&out[1]), CONTINUE_PLACEHOLDER);
        assert_eq!(text(&out[2]), TOOL_PLACEHOLDER);
        assert_eq!(text(&out[3]), OTHER_PLACEHOLDER);
        assert_eq!(text(&out[4]), ASSISTANT_PLACEHOLDER);
        assert_eq!(out.len(), input.len());
    }

    #[test]
    fn test_trailing_assistant_gets_one_continuation() {
        let input = vec![Message::user("hi"), Message::assistant("hello!")];
        let out = repair_messages(&input);
        assert_eq!(out.len(), 3);
        assert_eq!(out[2], Message::user(CONTINUE_PLACEHOLDER));
    }

    #[test]
    fn test_second_pass_is_noop() {
        let input = vec![
            Message::user("hi"),
            Message::empty(MessageRole::Assistant),
            Message::tool("c", "done"),
            Message::user("next"),
            Message::assistant("sure"),
        ];
        let once = repair_messages(&input);
        let twice = repair_messages(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sequence_ending_on_tool_is_left_alone() {
        let input = vec![Message::user("run it"), Message::tool("c", "ok")];
        let out = repair_messages(&input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = vec![Message::empty(MessageRole::Assistant)];
        let snapshot = input.clone();
        let _ = repair_messages(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_long_tool_output_is_truncated() {
        let long = "a".repeat(500);
        let input = vec![Message::tool("c", long), Message::user("and?")];
        let out = repair_messages(&input);
        let transition = text(&out[1]);
        assert!(transition.starts_with(TRANSITION_PREFIX));
        assert_eq!(
            transition.chars().count(),
            TRANSITION_PREFIX.chars().count() + TRANSITION_MAX_CHARS
        );
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = "混元".repeat(150);
        let input = vec![Message::tool("c", long), Message::user("继续")];
        let out = repair_messages(&input);
        let body = text(&out[1]).trim_start_matches(TRANSITION_PREFIX);
        assert_eq!(body.chars().count(), TRANSITION_MAX_CHARS);
    }

    #[test]
    fn test_parts_tool_output_is_rendered() {
        let tool = Message {
            tool_call_id: Some("c".into()),
            ..Message::with_content(
                MessageRole::Tool,
                MessageContent::Parts(vec![ContentPart::text("row 1"), ContentPart::text("row 2")]),
            )
        };
        let out = repair_messages(&[tool, Message::user("ok")]);
        assert_eq!(text(&out[1]), "Tool returned a result. row 1 row 2");
    }

    #[test]
    fn test_transition_uses_original_adjacency() {
        // tool -> user in input; normalization of the user message doesn't matter
        let input = vec![Message::tool("c", "r"), Message::user("")];
        let out = repair_messages(&input);
        assert_eq!(
            role_list(&out),
            vec![MessageRole::Tool, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(text(&out[2]), CONTINUE_PLACEHOLDER);
    }
}
