use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread,
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod migrations;
pub mod models;
mod repositories;

use migrations::run_migrations;

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

/// All SQLite access funnels through one dedicated worker thread; callers
/// submit closures and await the reply, so no async task ever blocks on
/// database I/O. The worker exits when the last `Database` handle drops
/// and its job channel disconnects.
#[derive(Clone)]
pub struct Database {
    // Declared before `worker` so the channel closes before the join.
    jobs: mpsc::Sender<Job>,
    worker: Arc<Worker>,
}

struct Worker {
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        let mut guard = match self.handle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = guard.take() {
            if let Err(join_err) = handle.join() {
                error!("Failed to join database thread: {join_err:?}");
            }
        }
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("failed to enable WAL mode")?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    run_migrations(&mut conn).context("failed to run database migrations")?;
    info!("Database ready at {}", path.display());
    Ok(conn)
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("flowbuddy-db".into())
            .spawn(move || {
                let mut conn = match open_connection(&db_path) {
                    Ok(conn) => {
                        if ready_tx.send(Ok(())).is_err() {
                            error!("Database creator dropped before ready signal");
                            return;
                        }
                        conn
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                // Runs until every job sender is gone.
                while let Ok(job) = job_rx.recv() {
                    job(&mut conn);
                }
                info!("Database thread shutting down");
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        Ok(Self {
            jobs: job_tx,
            worker: Arc::new(Worker {
                handle: Mutex::new(Some(handle)),
            }),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let job: Job = Box::new(move |conn| {
            if reply_tx.send(task(conn)).is_err() {
                error!("Database caller dropped before receiving result");
            }
        });

        self.jobs
            .send(job)
            .map_err(|_| anyhow!("database worker is no longer running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database worker terminated unexpectedly"))?
    }
}

#[cfg(test)]
pub(crate) fn temp_database() -> Database {
    let path = std::env::temp_dir().join(format!("flowbuddy-test-{}.sqlite3", uuid::Uuid::new_v4()));
    Database::new(path).expect("temp database")
}
