use serde_json::Value;

pub const NO_RESPONSE: &str = "No response";

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Pulls the assistant text out of a provider payload: the first choice's
/// message content, then a top-level `output`, then [`NO_RESPONSE`].
pub fn extract_reply(payload: &Value) -> String {
    non_empty_str(payload.pointer("/choices/0/message/content"))
        .or_else(|| non_empty_str(payload.get("output")))
        .unwrap_or(NO_RESPONSE)
        .to_string()
}
