//! Editor.js report documents produced by the supervisor.

use brief_graph::strip_code_fence;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    Paragraph,
    List,
    /// Any other Editor.js block type; passed through untouched.
    Other,
}

/// One block exactly as the model wrote it.
///
/// Only `type` is checked; every other key (`id`, `data`, `tunes`, ...) is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBlock {
    raw: Map<String, Value>,
}

impl ReportBlock {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(raw) if raw.get("type").is_some_and(Value::is_string) => Some(Self { raw }),
            _ => None,
        }
    }

    pub fn from_json(text: &str) -> Option<Self> {
        Self::from_value(serde_json::from_str(text).ok()?)
    }

    pub fn type_name(&self) -> &str {
        self.raw.get("type").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn kind(&self) -> BlockKind {
        match self.type_name() {
            "header" => BlockKind::Header,
            "paragraph" => BlockKind::Paragraph,
            "list" => BlockKind::List,
            _ => BlockKind::Other,
        }
    }

    pub fn data(&self) -> &Value {
        self.raw.get("data").unwrap_or(&Value::Null)
    }

    /// The block serialized with its original keys in their original order.
    pub fn to_json(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub time: Option<i64>,
    pub blocks: Vec<ReportBlock>,
}

impl ReportDocument {
    pub fn block_payloads(&self) -> impl Iterator<Item = String> + '_ {
        self.blocks.iter().map(ReportBlock::to_json)
    }
}

/// Parses assistant text as a report document.
///
/// The text must be a JSON object, optionally fenced, whose `blocks` is an array of
/// objects that each carry a string `type`. Anything else is not a report.
pub fn parse_report(content: &str) -> Option<ReportDocument> {
    let text = strip_code_fence(content.trim());
    if !text.starts_with('{') {
        return None;
    }
    let Value::Object(mut document) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    let time = document.get("time").and_then(Value::as_i64);
    let Value::Array(raw_blocks) = document.remove("blocks")? else {
        return None;
    };
    let blocks = raw_blocks.into_iter().map(ReportBlock::from_value).collect::<Option<Vec<_>>>()?;
    Some(ReportDocument { time, blocks })
}
