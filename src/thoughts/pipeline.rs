//! Thought intake: classify, persist, optionally research.
//!
//! Every submission is an independent task; the caller gets control back
//! immediately and the pipeline never surfaces an error to the user. A
//! failed classifier degrades to the keyword fallback, a failed research
//! call simply leaves the report absent.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::classifier::ThoughtClassifier;
use crate::db::models::{CapturedThought, ThoughtCategory};
use crate::db::Database;
use crate::state::SharedState;

#[derive(Clone)]
pub struct ThoughtPipeline {
    db: Database,
    classifier: Arc<dyn ThoughtClassifier>,
    state: Arc<SharedState>,
}

impl ThoughtPipeline {
    pub fn new(db: Database, classifier: Arc<dyn ThoughtClassifier>, state: Arc<SharedState>) -> Self {
        Self {
            db,
            classifier,
            state,
        }
    }

    /// Accepts a captured thought and returns immediately; classification,
    /// persistence and optional research run as detached tasks.
    pub fn submit(&self, text: String, selected: ThoughtCategory) {
        if text.is_empty() {
            warn!("ignoring empty thought submission");
            return;
        }

        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.process(text, selected).await;
        });
    }

    /// Runs one submission to the point where the thought is stored with a
    /// concrete category. Returns the handle of the detached research task,
    /// if one was scheduled.
    pub(crate) async fn process(
        &self,
        text: String,
        selected: ThoughtCategory,
    ) -> Option<JoinHandle<()>> {
        let category = self.resolve_category(&text, selected).await;
        let thought = CapturedThought::new(text.clone(), category);

        if let Err(err) = self.db.insert_thought(&thought).await {
            error!("failed to persist thought: {err:#}");
            return None;
        }
        info!("stored thought {} as {}", thought.id, category.as_str());

        // Research runs only for research items, and only when the user has
        // opted in. An explicitly chosen Reminder never researches.
        let should_research = self.state.background_research_enabled.get()
            && category == ThoughtCategory::Research;
        if !should_research {
            return None;
        }

        let pipeline = self.clone();
        let id = thought.id;
        Some(tokio::spawn(async move {
            pipeline.run_research(id, &text).await;
        }))
    }

    async fn resolve_category(&self, text: &str, selected: ThoughtCategory) -> ThoughtCategory {
        match selected {
            ThoughtCategory::Reminder | ThoughtCategory::Research => selected,
            ThoughtCategory::Auto => match self.classifier.classify_reminder(text).await {
                Ok(true) => ThoughtCategory::Reminder,
                Ok(false) => ThoughtCategory::Research,
                Err(err) => {
                    warn!("classifier unavailable ({err}), falling back to keyword check");
                    fallback_category(text)
                }
            },
        }
    }

    async fn run_research(&self, id: Uuid, text: &str) {
        let report = match self.classifier.generate_research(text).await {
            Ok(report) => report,
            Err(err) => {
                warn!("background research for thought {id} failed: {err}");
                return;
            }
        };

        // The session may have been finished (and the row deleted) while the
        // research call was in flight; a vanished row makes this a no-op.
        match self.db.update_thought_report(id, &report).await {
            Ok(true) => info!("attached research report to thought {id}"),
            Ok(false) => debug!("thought {id} no longer exists, dropping research report"),
            Err(err) => error!("failed to attach research report to thought {id}: {err:#}"),
        }
    }
}

/// Deterministic safety net when the remote classifier is unavailable.
pub(crate) fn fallback_category(text: &str) -> ThoughtCategory {
    if text.to_lowercase().contains("remind") {
        ThoughtCategory::Reminder
    } else {
        ThoughtCategory::Research
    }
}

#[cfg(test)]
mod tests;
