//! Crawl task: one submitted batch of URLs and its result buffer

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_row, FetchOptions};
use crate::crawler::limiter::DomainLimiters;
use crate::output::ResultBuffer;
use crate::state::TaskStatus;
use crate::MetacrawlError;
use parking_lot::RwLock;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A batch of URLs crawled concurrently into one CSV buffer
///
/// The status and the buffer sit behind separate locks, so polling the
/// status never waits on a worker that is appending a row.
pub struct CrawlTask {
    id: String,
    urls: Vec<String>,
    options: FetchOptions,
    max_concurrent_fetches: usize,
    status: RwLock<TaskStatus>,
    buffer: ResultBuffer,
    client: Client,
    limiters: Arc<DomainLimiters>,
}

impl CrawlTask {
    /// Creates a task in the `NotStarted` state
    ///
    /// The fetch settings are captured from `config` now; later changes to
    /// the service configuration do not affect this task.
    pub fn new(
        id: impl Into<String>,
        urls: Vec<String>,
        client: Client,
        limiters: Arc<DomainLimiters>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            id: id.into(),
            urls,
            options: FetchOptions::from_config(config),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1) as usize,
            status: RwLock::new(TaskStatus::NotStarted),
            buffer: ResultBuffer::new(),
            client,
            limiters,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The input URLs in submission order
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn status(&self) -> TaskStatus {
        *self.status.read()
    }

    /// Serialized rows written so far, header first
    pub fn render(&self) -> Vec<u8> {
        self.buffer.render()
    }

    /// Number of data rows written so far
    pub fn row_count(&self) -> usize {
        self.buffer.data_rows()
    }

    /// Moves the task to `next`, rejecting anything but the next step forward
    fn advance_to(&self, next: TaskStatus) -> Result<(), MetacrawlError> {
        let mut status = self.status.write();
        if !status.can_transition_to(next) {
            return Err(MetacrawlError::InvalidTransition {
                from: *status,
                to: next,
            });
        }

        tracing::debug!("Task {} {} -> {}", self.id, *status, next);
        *status = next;
        Ok(())
    }

    /// Crawls every URL of the task and marks it completed
    ///
    /// Writes the header, fans out one worker per URL (at most
    /// `max-concurrent-fetches` at a time) and waits for all of them. A
    /// worker that panics is logged and contributes no row. Fails only if
    /// the task was already started.
    pub async fn process(self: Arc<Self>) -> Result<(), MetacrawlError> {
        self.buffer.write_header()?;
        self.advance_to(TaskStatus::InProgress)?;
        tracing::info!("Task {} started with {} URLs", self.id, self.urls.len());

        let ceiling = Arc::new(Semaphore::new(self.max_concurrent_fetches));
        let mut workers = JoinSet::new();

        for raw_url in &self.urls {
            let Ok(permit) = Arc::clone(&ceiling).acquire_owned().await else {
                break;
            };
            let task = Arc::clone(&self);
            let raw_url = raw_url.clone();

            workers.spawn(async move {
                let _permit = permit;
                let row = fetch_row(&task.client, &task.limiters, &raw_url, &task.options).await;
                if let Some(row) = row {
                    if let Err(e) = task.buffer.append(&row) {
                        tracing::error!("Failed to record row for {}: {}", raw_url, e);
                    }
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker of task {} failed: {}", self.id, e);
            }
        }

        self.advance_to(TaskStatus::Completed)?;
        tracing::info!(
            "Task {} completed: {} rows for {} URLs",
            self.id,
            self.row_count(),
            self.urls.len()
        );
        Ok(())
    }
}

impl std::fmt::Debug for CrawlTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlTask")
            .field("id", &self.id)
            .field("urls", &self.urls.len())
            .field("status", &self.status())
            .finish()
    }
}
