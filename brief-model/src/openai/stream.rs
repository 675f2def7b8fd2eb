//! Incremental decoding of streamed chat completions (`text/event-stream`).

use super::convert::{self, ChatCompletionResponse};
use brief_core::{LlmResponse, ToolCall};
use std::collections::BTreeMap;

/// Turns raw body chunks into responses.
///
/// Bytes are buffered until a whole line has arrived, so a UTF-8 character split across
/// network chunks is decoded intact. Text deltas come out as partial responses; tool-call
/// fragments are accumulated by index and released with the chunk that carries the
/// finish reason.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    // index -> (id, name, argument text)
    pending_calls: BTreeMap<u32, (String, String, String)>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one body chunk and returns the responses completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<LlmResponse> {
        self.buffer.extend_from_slice(bytes);
        let mut responses = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            responses.extend(self.decode_line(&line));
        }
        responses
    }

    /// Decodes whatever is left once the body has ended.
    pub fn finish(&mut self) -> Vec<LlmResponse> {
        let rest = std::mem::take(&mut self.buffer);
        self.decode_line(&rest).into_iter().collect()
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<LlmResponse> {
        let line = String::from_utf8_lossy(line);
        let data = line.trim().strip_prefix("data:")?.trim();
        if data.is_empty() || data == "[DONE]" {
            return None;
        }

        let chunk = match serde_json::from_str::<ChatCompletionResponse>(data) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unparseable stream chunk");
                return None;
            }
        };
        let choice = chunk.choices.first()?;
        let delta = choice.delta.clone().unwrap_or_default();

        for call in delta.tool_calls.unwrap_or_default() {
            let entry = self
                .pending_calls
                .entry(call.index)
                .or_insert_with(|| (format!("call_{}", call.index), String::new(), String::new()));
            if let Some(id) = call.id {
                entry.0 = id;
            }
            if let Some(function) = call.function {
                if let Some(name) = function.name {
                    entry.1 = name;
                }
                if let Some(arguments) = function.arguments {
                    entry.2.push_str(&arguments);
                }
            }
        }

        let text = delta.content.unwrap_or_default();
        match choice.finish_reason.as_deref() {
            None if text.is_empty() => None,
            None => Some(LlmResponse::partial(text)),
            Some(reason) => {
                let tool_calls: Vec<ToolCall> = std::mem::take(&mut self.pending_calls)
                    .into_values()
                    .map(|(id, name, args)| ToolCall::new(id, name, convert::parse_arguments(&args)))
                    .collect();
                Some(LlmResponse {
                    text,
                    tool_calls,
                    usage_metadata: chunk.usage.clone().map(Into::into),
                    finish_reason: Some(convert::finish_reason(reason)),
                    partial: false,
                    turn_complete: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::FinishReason;
    use serde_json::json;

    fn text_of(responses: &[LlmResponse]) -> String {
        responses.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_character_split_across_chunks() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Umsatz +15% \u{20ac}\"}}]}\n\n\
                    data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n\
                    data: [DONE]\n\n";
        let bytes = body.as_bytes();
        // Cut inside the three-byte euro sign.
        let euro = body.find('\u{20ac}').unwrap();

        let mut decoder = StreamDecoder::new();
        let mut responses = decoder.push(&bytes[..euro + 1]);
        assert!(responses.is_empty());
        responses.extend(decoder.push(&bytes[euro + 1..]));
        responses.extend(decoder.finish());

        assert_eq!(text_of(&responses), "Umsatz +15% \u{20ac}");
        assert!(responses.iter().all(|r| !r.text.contains('\u{fffd}')));
        assert_eq!(responses.last().unwrap().finish_reason, Some(FinishReason::Stop));
    }

    #[test]
    fn test_tool_call_fragments_accumulate() {
        let lines = [
            json!({"choices": [{"delta": {"tool_calls": [
                {"index": 0, "id": "call_a", "function": {"name": "sum_tool", "arguments": "{\"data\":"}}
            ]}}]}),
            json!({"choices": [{"delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "[{\"value\":2}]}"}}
            ]}}]}),
            json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}],
                   "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}}),
        ];
        let body: String = lines.iter().map(|l| format!("data: {l}\n\n")).collect();

        let mut decoder = StreamDecoder::new();
        let mut responses = Vec::new();
        for piece in body.as_bytes().chunks(7) {
            responses.extend(decoder.push(piece));
        }
        responses.extend(decoder.finish());

        assert_eq!(responses.len(), 1);
        let response = &responses[0];
        assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_a");
        assert_eq!(response.tool_calls[0].name, "sum_tool");
        assert_eq!(response.tool_calls[0].args, json!({"data": [{"value": 2}]}));
        assert_eq!(response.usage_metadata.as_ref().unwrap().total_token_count, 7);
    }

    #[test]
    fn test_unterminated_last_line_and_noise() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push(b": keep-alive\n\ndata: not json\n").is_empty());
        assert!(decoder.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}").is_empty());
        let rest = decoder.finish();
        assert_eq!(text_of(&rest), "hi");
        assert!(rest[0].partial);
    }
}
