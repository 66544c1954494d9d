use anyhow::{anyhow, Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    models::{CapturedThought, ResearchReport, ThoughtCategory},
    parse_datetime, Database,
};

fn category_from_str(value: &str) -> Result<ThoughtCategory> {
    match value {
        "Reminder" => Ok(ThoughtCategory::Reminder),
        "Research" => Ok(ThoughtCategory::Research),
        "Auto" => Ok(ThoughtCategory::Auto),
        _ => Err(anyhow!("unknown thought category '{value}'")),
    }
}

fn row_to_thought(row: &Row) -> Result<CapturedThought> {
    let id: String = row.get("id")?;
    let created_at: String = row.get("created_at")?;
    let category: String = row.get("category")?;
    let report_json: Option<String> = row.get("research_report")?;

    let research_report = report_json
        .map(|json| {
            serde_json::from_str::<ResearchReport>(&json)
                .with_context(|| "stored research report is not valid JSON")
        })
        .transpose()?;

    Ok(CapturedThought {
        id: Uuid::parse_str(&id).with_context(|| format!("invalid thought id '{id}'"))?,
        text: row.get("text")?,
        category: category_from_str(&category)?,
        created_at: parse_datetime(&created_at)?,
        opened: row.get::<_, i64>("opened")? != 0,
        research_report,
    })
}

impl Database {
    pub async fn insert_thought(&self, thought: &CapturedThought) -> Result<()> {
        let record = thought.clone();
        self.execute(move |conn| {
            let report_json = record
                .research_report
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;
            conn.execute(
                "INSERT INTO thoughts (id, text, category, created_at, opened, research_report)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id.to_string(),
                    record.text,
                    record.category.as_str(),
                    record.created_at.to_rfc3339(),
                    i64::from(record.opened),
                    report_json,
                ],
            )
            .with_context(|| "failed to insert thought")?;
            Ok(())
        })
        .await
    }

    pub async fn get_thought(&self, id: Uuid) -> Result<Option<CapturedThought>> {
        self.execute(move |conn| {
            conn.query_row(
                "SELECT id, text, category, created_at, opened, research_report
                 FROM thoughts WHERE id = ?1",
                params![id.to_string()],
                |row| Ok(row_to_thought(row)),
            )
            .optional()
            .with_context(|| "failed to load thought")?
            .transpose()
        })
        .await
    }

    /// Newest-first listing for the dashboard sidebar.
    pub async fn list_thoughts(&self) -> Result<Vec<CapturedThought>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, text, category, created_at, opened, research_report
                 FROM thoughts ORDER BY created_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut thoughts = Vec::new();
            while let Some(row) = rows.next()? {
                thoughts.push(row_to_thought(row)?);
            }
            Ok(thoughts)
        })
        .await
    }

    /// Attaches a research report to a stored thought. Returns `false` when
    /// the row no longer exists (the session was finished while research was
    /// still in flight), which callers treat as a no-op.
    pub async fn update_thought_report(
        &self,
        id: Uuid,
        report: &ResearchReport,
    ) -> Result<bool> {
        let report = report.clone();
        self.execute(move |conn| {
            let json = serde_json::to_string(&report)?;
            let affected = conn
                .execute(
                    "UPDATE thoughts SET research_report = ?1 WHERE id = ?2",
                    params![json, id.to_string()],
                )
                .with_context(|| "failed to attach research report")?;
            Ok(affected > 0)
        })
        .await
    }

    pub async fn mark_thought_opened(&self, id: Uuid) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "UPDATE thoughts SET opened = 1 WHERE id = ?1",
                params![id.to_string()],
            )
            .with_context(|| "failed to mark thought opened")?;
            Ok(())
        })
        .await
    }

    pub async fn delete_all_thoughts(&self) -> Result<usize> {
        self.execute(|conn| {
            let deleted = conn
                .execute("DELETE FROM thoughts", [])
                .with_context(|| "failed to delete thoughts")?;
            Ok(deleted)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::models::{CapturedThought, ResearchReport, ThoughtCategory};
    use crate::db::temp_database;

    fn sample_report() -> ResearchReport {
        ResearchReport {
            topic: "RNN".into(),
            summary: "Recurrent neural networks.".into(),
            details: "Sequence models with feedback connections.".into(),
            action_items: vec!["https://en.wikipedia.org/wiki/RNN".into()],
        }
    }

    #[tokio::test]
    async fn insert_and_list_newest_first() {
        let db = temp_database();
        let older = CapturedThought::new("first".into(), ThoughtCategory::Reminder);
        let mut newer = CapturedThought::new("second".into(), ThoughtCategory::Research);
        newer.created_at = older.created_at + chrono::Duration::seconds(5);

        db.insert_thought(&older).await.unwrap();
        db.insert_thought(&newer).await.unwrap();

        let listed = db.list_thoughts().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].text, "second");
        assert_eq!(listed[1].text, "first");
    }

    #[tokio::test]
    async fn report_round_trips_through_storage() {
        let db = temp_database();
        let thought = CapturedThought::new("What is RNN?".into(), ThoughtCategory::Research);
        db.insert_thought(&thought).await.unwrap();

        let attached = db
            .update_thought_report(thought.id, &sample_report())
            .await
            .unwrap();
        assert!(attached);

        let stored = db.get_thought(thought.id).await.unwrap().unwrap();
        assert_eq!(stored.research_report, Some(sample_report()));
    }

    #[tokio::test]
    async fn attaching_to_missing_row_reports_no_op() {
        let db = temp_database();
        let orphan = CapturedThought::new("gone".into(), ThoughtCategory::Research);
        let attached = db
            .update_thought_report(orphan.id, &sample_report())
            .await
            .unwrap();
        assert!(!attached);
    }

    #[tokio::test]
    async fn delete_all_clears_the_table() {
        let db = temp_database();
        db.insert_thought(&CapturedThought::new("a".into(), ThoughtCategory::Reminder))
            .await
            .unwrap();
        db.insert_thought(&CapturedThought::new("b".into(), ThoughtCategory::Research))
            .await
            .unwrap();

        let deleted = db.delete_all_thoughts().await.unwrap();
        assert_eq!(deleted, 2);
        assert!(db.list_thoughts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn opened_flag_persists() {
        let db = temp_database();
        let thought = CapturedThought::new("open me".into(), ThoughtCategory::Reminder);
        db.insert_thought(&thought).await.unwrap();
        db.mark_thought_opened(thought.id).await.unwrap();

        let stored = db.get_thought(thought.id).await.unwrap().unwrap();
        assert!(stored.opened);
    }
}
