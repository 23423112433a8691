//! Reconstruction of the final answer from a streaming completion.
//!
//! The upstream frequently resends the full text-so-far on every chunk
//! instead of a delta, so naive concatenation duplicates the answer. The
//! accumulator compares each candidate against what it has already built:
//! a candidate extending the accumulated text contributes only its suffix;
//! anything else is appended whole (a heuristic for reordered or fresh
//! segments, not a correctness guarantee).
//!
//! Lines are consumed in one forward pass and never revisited.

use crate::extract::{COMPLETION_NO_ANSWER, chunk_text};

/// Accumulates server-sent lines into the final answer text.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    saw_text: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one server-sent line.
    ///
    /// Strips an optional `data:` prefix and surrounding whitespace;
    /// ignores blank lines and the `[DONE]` terminator; skips chunks that
    /// fail to parse as JSON or carry no text.
    pub fn push_line(&mut self, line: &str) {
        let chunk_str = line.strip_prefix("data:").unwrap_or(line).trim();
        if chunk_str.is_empty() || chunk_str == "[DONE]" {
            return;
        }
        let Ok(chunk) = serde_json::from_str::<serde_json::Value>(chunk_str) else {
            return;
        };
        let Some(candidate) = chunk_text(&chunk) else {
            return;
        };

        // Cumulative resend: keep only the new suffix.
        let delta = match candidate.strip_prefix(self.text.as_str()) {
            Some(suffix) => suffix,
            None => candidate.as_str(),
        };
        if !delta.is_empty() {
            self.text.push_str(delta);
        }
        self.saw_text = true;
    }

    /// Final answer, or the no-answer sentinel if no chunk produced text.
    pub fn finish(self) -> String {
        if self.saw_text && !self.text.is_empty() {
            self.text
        } else {
            COMPLETION_NO_ANSWER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_line(text: &str) -> String {
        format!(
            "data: {{\"result\":{{\"alternatives\":[{{\"message\":{{\"text\":\"{text}\"}}}}]}}}}"
        )
    }

    #[test]
    fn test_cumulative_resend_yields_single_copy() {
        let mut acc = StreamAccumulator::new();
        acc.push_line(&chunk_line("Hello"));
        acc.push_line(&chunk_line("Hello wor"));
        acc.push_line(&chunk_line("Hello world"));
        assert_eq!(acc.finish(), "Hello world");
    }

    #[test]
    fn test_out_of_order_chunk_appended_whole() {
        let mut acc = StreamAccumulator::new();
        acc.push_line(&chunk_line("Hello"));
        acc.push_line(&chunk_line("Goodbye"));
        assert_eq!(acc.finish(), "HelloGoodbye");
    }

    #[test]
    fn test_true_delta_chunks_concatenate() {
        let mut acc = StreamAccumulator::new();
        acc.push_line(&chunk_line("Hel"));
        acc.push_line(&chunk_line("Hello"));
        acc.push_line(&chunk_line("Hello!"));
        assert_eq!(acc.finish(), "Hello!");
    }

    #[test]
    fn test_blank_done_and_garbage_lines_skipped() {
        let mut acc = StreamAccumulator::new();
        acc.push_line("");
        acc.push_line("data:");
        acc.push_line("data: not-json{{");
        acc.push_line(&chunk_line("ok"));
        acc.push_line("data: [DONE]");
        acc.push_line("[DONE]");
        assert_eq!(acc.finish(), "ok");
    }

    #[test]
    fn test_line_without_data_prefix_accepted() {
        let mut acc = StreamAccumulator::new();
        let bare = chunk_line("raw");
        acc.push_line(bare.strip_prefix("data: ").unwrap());
        assert_eq!(acc.finish(), "raw");
    }

    #[test]
    fn test_empty_stream_yields_sentinel() {
        let acc = StreamAccumulator::new();
        assert_eq!(acc.finish(), COMPLETION_NO_ANSWER);
    }

    #[test]
    fn test_textless_chunks_yield_sentinel() {
        let mut acc = StreamAccumulator::new();
        acc.push_line("data: {\"result\":{\"alternatives\":[{\"message\":{}}]}}");
        assert_eq!(acc.finish(), COMPLETION_NO_ANSWER);
    }
}
