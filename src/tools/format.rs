//! Response formatting for MCP tools.
//!
//! Every tool answers with the same envelope: a single text content block
//! holding the payload serialized as 2-space indented JSON.

use crate::error::ToolResult;
use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};

/// Indentation used for every serialized payload.
pub const JSON_INDENTATION: &[u8] = b"  ";

/// Uniform tool response: `{ "content": [ { "type": "text", "text": ... } ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl Envelope {
    /// Envelope with one text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// The text of the first block.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        })
    }
}

/// The protocol result adds `isError: false` next to the envelope's content;
/// the envelope itself stays the exact `{"content": [...]}` shape.
impl From<Envelope> for CallToolResult {
    fn from(envelope: Envelope) -> Self {
        let content = envelope
            .content
            .into_iter()
            .map(|block| match block {
                ContentBlock::Text { text } => Content::text(text),
            })
            .collect();
        CallToolResult::success(content)
    }
}

/// Serialize a payload into an [`Envelope`].
pub fn format_payload<T: Serialize>(payload: &T) -> ToolResult<Envelope> {
    let mut buf = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENTATION);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    payload.serialize(&mut ser)?;

    // serde_json only emits valid UTF-8
    let text = String::from_utf8_lossy(&buf).into_owned();
    Ok(Envelope::text(text))
}
