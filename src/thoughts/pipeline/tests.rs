use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::*;
use crate::db::models::ResearchReport;
use crate::db::temp_database;
use crate::inference::InferenceError;

fn sample_report() -> ResearchReport {
    ResearchReport {
        topic: "Recurrent Neural Networks".into(),
        summary: "Networks with feedback connections for sequence data.".into(),
        details: "RNNs process sequences one element at a time…".into(),
        action_items: vec![
            "https://en.wikipedia.org/wiki/Recurrent_neural_network".into(),
            "https://colah.github.io/posts/2015-08-Understanding-LSTMs/".into(),
        ],
    }
}

struct MockClassifier {
    is_reminder: bool,
    fail_classify: bool,
    fail_research: bool,
    hold_research: Option<Arc<Notify>>,
    classify_calls: AtomicUsize,
    research_calls: AtomicUsize,
}

impl MockClassifier {
    fn new(is_reminder: bool) -> Arc<Self> {
        Arc::new(Self {
            is_reminder,
            fail_classify: false,
            fail_research: false,
            hold_research: None,
            classify_calls: AtomicUsize::new(0),
            research_calls: AtomicUsize::new(0),
        })
    }

    fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            is_reminder: false,
            fail_classify: true,
            fail_research: true,
            hold_research: None,
            classify_calls: AtomicUsize::new(0),
            research_calls: AtomicUsize::new(0),
        })
    }

    fn research_calls(&self) -> usize {
        self.research_calls.load(Ordering::SeqCst)
    }

    fn classify_calls(&self) -> usize {
        self.classify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThoughtClassifier for MockClassifier {
    async fn classify_reminder(&self, _text: &str) -> Result<bool, InferenceError> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_classify {
            return Err(InferenceError::EmptyChoices);
        }
        Ok(self.is_reminder)
    }

    async fn generate_research(&self, _query: &str) -> Result<ResearchReport, InferenceError> {
        self.research_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold_research {
            hold.notified().await;
        }
        if self.fail_research {
            return Err(InferenceError::EmptyChoices);
        }
        Ok(sample_report())
    }
}

fn pipeline_with(
    classifier: Arc<MockClassifier>,
    research_enabled: bool,
) -> (ThoughtPipeline, Database) {
    let db = temp_database();
    let state = Arc::new(SharedState::new(false, 10, research_enabled));
    (
        ThoughtPipeline::new(db.clone(), classifier, state),
        db,
    )
}

#[test]
fn fallback_is_reminder_iff_text_mentions_remind() {
    assert_eq!(
        fallback_category("Remind me to call mom"),
        ThoughtCategory::Reminder
    );
    assert_eq!(
        fallback_category("set a REMINDER for tomorrow"),
        ThoughtCategory::Reminder
    );
    assert_eq!(fallback_category("Buy groceries"), ThoughtCategory::Research);
    assert_eq!(fallback_category("What is RNN?"), ThoughtCategory::Research);
    assert_eq!(fallback_category(""), ThoughtCategory::Research);
}

#[tokio::test]
async fn classifier_verdict_overrides_keyword_heuristic() {
    // "Buy milk" has no "remind" substring; the classifier still calls it a
    // reminder and wins.
    let classifier = MockClassifier::new(true);
    let (pipeline, db) = pipeline_with(classifier.clone(), true);

    let research = pipeline
        .process("Buy milk".into(), ThoughtCategory::Auto)
        .await;
    assert!(research.is_none());

    let stored = db.list_thoughts().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, ThoughtCategory::Reminder);
    assert_eq!(classifier.research_calls(), 0);
}

#[tokio::test]
async fn classifier_failure_falls_back_to_keyword_check() {
    let classifier = MockClassifier::unavailable();
    let (pipeline, db) = pipeline_with(classifier.clone(), false);

    pipeline
        .process("remind me about standup".into(), ThoughtCategory::Auto)
        .await;
    pipeline
        .process("compare React vs Vue".into(), ThoughtCategory::Auto)
        .await;

    let stored = db.list_thoughts().await.unwrap();
    let categories: Vec<_> = stored
        .iter()
        .map(|t| (t.text.as_str(), t.category))
        .collect();
    assert!(categories.contains(&("remind me about standup", ThoughtCategory::Reminder)));
    assert!(categories.contains(&("compare React vs Vue", ThoughtCategory::Research)));
    assert_eq!(classifier.classify_calls(), 2);
}

#[tokio::test]
async fn research_report_is_attached_when_enabled() {
    let classifier = MockClassifier::new(false);
    let (pipeline, db) = pipeline_with(classifier.clone(), true);

    let research = pipeline
        .process("What is RNN?".into(), ThoughtCategory::Auto)
        .await
        .expect("research task scheduled");
    research.await.unwrap();

    let stored = db.list_thoughts().await.unwrap();
    assert_eq!(stored[0].category, ThoughtCategory::Research);
    assert_eq!(stored[0].research_report, Some(sample_report()));
}

#[tokio::test]
async fn research_schedule_matrix() {
    // {explicit Reminder, explicit Research, auto→research} × {enabled, disabled}
    let cases = [
        (ThoughtCategory::Reminder, true, false),
        (ThoughtCategory::Reminder, false, false),
        (ThoughtCategory::Research, true, true),
        (ThoughtCategory::Research, false, false),
        (ThoughtCategory::Auto, true, true),
        (ThoughtCategory::Auto, false, false),
    ];

    for (selected, enabled, expect_research) in cases {
        let classifier = MockClassifier::new(false); // auto resolves to Research
        let (pipeline, _db) = pipeline_with(classifier.clone(), enabled);

        let research = pipeline
            .process("look up RNN architectures".into(), selected)
            .await;
        if let Some(handle) = research {
            handle.await.unwrap();
        }

        assert_eq!(
            classifier.research_calls() > 0,
            expect_research,
            "selected={selected:?} enabled={enabled}"
        );
    }
}

#[tokio::test]
async fn failed_research_leaves_thought_valid_without_report() {
    let classifier = Arc::new(MockClassifier {
        is_reminder: false,
        fail_classify: false,
        fail_research: true,
        hold_research: None,
        classify_calls: AtomicUsize::new(0),
        research_calls: AtomicUsize::new(0),
    });
    let (pipeline, db) = pipeline_with(classifier, true);

    let research = pipeline
        .process("how does photosynthesis work".into(), ThoughtCategory::Auto)
        .await
        .expect("research task scheduled");
    research.await.unwrap();

    let stored = db.list_thoughts().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, ThoughtCategory::Research);
    assert!(stored[0].research_report.is_none());
}

#[tokio::test]
async fn late_research_result_is_dropped_when_row_was_deleted() {
    let hold = Arc::new(Notify::new());
    let classifier = Arc::new(MockClassifier {
        is_reminder: false,
        fail_classify: false,
        fail_research: false,
        hold_research: Some(hold.clone()),
        classify_calls: AtomicUsize::new(0),
        research_calls: AtomicUsize::new(0),
    });
    let (pipeline, db) = pipeline_with(classifier, true);

    let research = pipeline
        .process("check price of MacBook Pro".into(), ThoughtCategory::Research)
        .await
        .expect("research task scheduled");

    // Session finishes while research is parked mid-call.
    db.delete_all_thoughts().await.unwrap();
    hold.notify_one();
    research.await.unwrap();

    assert!(db.list_thoughts().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_submissions_do_not_cross_contaminate() {
    let classifier = MockClassifier::new(false);
    let (pipeline, db) = pipeline_with(classifier, false);

    let a = pipeline.process("What is quantum computing?".into(), ThoughtCategory::Auto);
    let b = pipeline.process("remind me to stretch".into(), ThoughtCategory::Auto);
    let c = pipeline.process("Pick up dry cleaning".into(), ThoughtCategory::Reminder);
    tokio::join!(a, b, c);

    let stored = db.list_thoughts().await.unwrap();
    assert_eq!(stored.len(), 3);
    for thought in stored {
        match thought.text.as_str() {
            "What is quantum computing?" => {
                assert_eq!(thought.category, ThoughtCategory::Research);
            }
            "remind me to stretch" => {
                // classifier said research for everything in this mock
                assert_eq!(thought.category, ThoughtCategory::Research);
            }
            "Pick up dry cleaning" => {
                assert_eq!(thought.category, ThoughtCategory::Reminder);
            }
            other => panic!("unexpected thought {other}"),
        }
    }
}
