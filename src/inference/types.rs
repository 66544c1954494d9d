//! Wire types for the chat-completion endpoint.
//!
//! All three inference modes (vision, reminder classifier, research
//! generator) share the same request/response envelope; only the messages
//! and sampling parameters differ.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: i32,
    pub n: u32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    pub stream: bool,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    /// Base64-encoded attachments for the vision mode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
            images: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
            images: None,
        }
    }

    pub fn user_with_image(content: impl Into<String>, image_base64: String) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
            images: Some(vec![image_base64]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// One screen snapshot classified by the vision model. Ephemeral: consumed
/// to update the current-distraction field and discarded.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScreenContext {
    pub status: ScreenStatus,
    pub app: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScreenStatus {
    Work,
    Distracted,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderVerdict {
    pub is_reminder: bool,
}

/// Strips surrounding markdown code-fence markers from a model response.
///
/// Models frequently wrap JSON answers in ```` ```json … ``` ```` even when
/// told not to; parsing must accept both fenced and bare payloads.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
