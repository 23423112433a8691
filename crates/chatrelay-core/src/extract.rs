//! Defensive extraction of answer text from upstream payloads.
//!
//! The provider returns structurally different JSON depending on the
//! invoked mode (plain completion, assistant with file_search, stateful
//! agent), and no schema is enforced. Extraction is modeled as an ordered
//! list of independent shape probes over [`serde_json::Value`]; the first
//! probe yielding non-empty text wins. A new upstream shape is a new list
//! entry, not a new branch in a monolithic parser.
//!
//! Nothing in this module can fail: a payload matching no known shape
//! resolves to a sentinel string, and an explicit upstream `error` field
//! is detected before any shape probing.

use serde_json::Value;

/// Sentinel answer when no shape probe matches a completion payload.
pub const COMPLETION_NO_ANSWER: &str = "No answer came back from the model.";

/// User-visible marker for assistant (memory mode) failures.
pub const ASSISTANT_ERROR_PREFIX: &str = "Assistant error: ";

/// User-visible marker for agent mode failures.
pub const AGENT_ERROR_PREFIX: &str = "Agent error: ";

/// Terminal agent-mode answer after the single fresh retry also failed.
pub const AGENT_FAILURE_ANSWER: &str = "Something went wrong, let's try that question again.";

/// Ordered shape probes; first non-empty match wins.
const SHAPE_PROBES: &[fn(&Value) -> Option<String>] = &[
    probe_output_text,
    probe_result_alternatives,
    probe_result_response,
    probe_choices,
    probe_output_items,
    probe_root_response,
];

/// Detect an explicit `error` field in the payload.
///
/// Takes priority over all shape probing: an error object yields its
/// `message`, else its `code`, else its stringified form.
pub fn payload_error(payload: &Value) -> Option<String> {
    let err = payload.get("error")?;
    if err.is_null() {
        return None;
    }
    if let Some(obj) = err.as_object() {
        if let Some(message) = obj.get("message").and_then(Value::as_str) {
            if !message.is_empty() {
                return Some(message.to_string());
            }
        }
        if let Some(code) = obj.get("code") {
            return Some(stringify(code));
        }
    }
    Some(stringify(err))
}

/// Probe all recognized payload shapes in precedence order.
///
/// Pure function of its input; returns `None` when nothing matched.
pub fn answer_text(payload: &Value) -> Option<String> {
    SHAPE_PROBES.iter().find_map(|probe| probe(payload))
}

/// Normalize a plain completion payload to an answer string.
///
/// Shape mismatch is not an error: the caller always receives some text.
pub fn completion_answer(payload: &Value) -> String {
    answer_text(payload).unwrap_or_else(|| COMPLETION_NO_ANSWER.to_string())
}

/// Extract the candidate full-text-so-far from one streaming chunk.
///
/// Chunks carry either `message.text` or a list of content parts under
/// `message.content`; both live below `result.alternatives[0]`.
pub fn chunk_text(chunk: &Value) -> Option<String> {
    let message = chunk
        .get("result")?
        .get("alternatives")?
        .get(0)?
        .get("message")?;
    if let Some(text) = non_empty_str(message.get("text")) {
        return Some(text);
    }
    concat_content_texts(message.get("content"))
}

// --- individual shape probes -------------------------------------------

/// Shape 1: top-level `output_text`.
fn probe_output_text(payload: &Value) -> Option<String> {
    non_empty_str(payload.get("output_text"))
}

/// Shape 2: `result.alternatives[0].message.text`, else the concatenation
/// of `message.content[*].text`. Also accepts `result.output_text`, which
/// the Responses endpoint emits for some assistant runs.
fn probe_result_alternatives(payload: &Value) -> Option<String> {
    let result = payload.get("result")?;
    if let Some(text) = non_empty_str(result.get("output_text")) {
        return Some(text);
    }
    let message = result.get("alternatives")?.get(0)?.get("message")?;
    if let Some(text) = non_empty_str(message.get("text")) {
        return Some(text);
    }
    concat_content_texts(message.get("content"))
}

/// Shape 3: `result.response.text`.
fn probe_result_response(payload: &Value) -> Option<String> {
    non_empty_str(payload.get("result")?.get("response")?.get("text"))
}

/// Shape 4: OpenAI-compatible `choices[0].message.content` or `.text`.
fn probe_choices(payload: &Value) -> Option<String> {
    let message = payload.get("choices")?.get(0)?.get("message")?;
    non_empty_str(message.get("content")).or_else(|| non_empty_str(message.get("text")))
}

/// Shape 5: `output[*]` -- first entry with concatenated `content[*].text`,
/// else the first entry carrying a plain `text`.
fn probe_output_items(payload: &Value) -> Option<String> {
    let items = payload.get("output")?.as_array()?;
    for item in items {
        if let Some(text) = concat_content_texts(item.get("content")) {
            return Some(text);
        }
        if let Some(text) = non_empty_str(item.get("text")) {
            return Some(text);
        }
    }
    None
}

/// Shape 6: root-level `response.text`.
fn probe_root_response(payload: &Value) -> Option<String> {
    non_empty_str(payload.get("response")?.get("text"))
}

// --- helpers -----------------------------------------------------------

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Concatenate the `text` of every object in a content-part array.
fn concat_content_texts(content: Option<&Value>) -> Option<String> {
    let parts = content?.as_array()?;
    let joined: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if joined.is_empty() { None } else { Some(joined) }
}

fn stringify(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}
