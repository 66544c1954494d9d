use anyhow::{bail, Context, Result};
use rusqlite::{Connection, Transaction};

const CURRENT_SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    while version < CURRENT_SCHEMA_VERSION {
        let tx = conn
            .transaction()
            .context("failed to begin migration transaction")?;

        let next = version + 1;
        match next {
            1 => migrate_to_v1(&tx)?,
            other => bail!("no migration registered for schema version {other}"),
        }

        tx.pragma_update(None, "user_version", next)
            .context("failed to bump user_version")?;
        tx.commit().context("failed to commit migration")?;
        version = next;
    }

    Ok(())
}

fn migrate_to_v1(tx: &Transaction) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS thoughts (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL,
            opened INTEGER NOT NULL DEFAULT 0,
            research_report TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_thoughts_created_at
            ON thoughts(created_at DESC);",
    )
    .context("failed to create thoughts table")?;
    Ok(())
}
