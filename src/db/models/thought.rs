//! Captured-thought data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ThoughtCategory {
    Reminder,
    Research,
    /// Pending state: resolved by the remote classifier (or the keyword
    /// fallback) before the thought is ever persisted.
    Auto,
}

impl ThoughtCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThoughtCategory::Reminder => "Reminder",
            ThoughtCategory::Research => "Research",
            ThoughtCategory::Auto => "Auto",
        }
    }
}

/// One offloaded thought, created on submit and enriched in place when
/// classification and (optionally) research complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedThought {
    pub id: Uuid,
    pub text: String,
    pub category: ThoughtCategory,
    pub created_at: DateTime<Utc>,
    pub opened: bool,
    pub research_report: Option<ResearchReport>,
}

impl CapturedThought {
    pub fn new(text: String, category: ThoughtCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            category,
            created_at: Utc::now(),
            opened: false,
            research_report: None,
        }
    }
}

/// Immutable once attached to a thought.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResearchReport {
    pub topic: String,
    pub summary: String,
    pub details: String,
    /// At most 5 URL-like strings.
    pub action_items: Vec<String>,
}
