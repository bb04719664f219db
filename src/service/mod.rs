//! Metadata crawl service
//!
//! [`MetaCrawl`] is the long-lived owner of everything shared between tasks:
//! the crawler configuration, the HTTP client, the per-domain limiters and
//! the task registry. Submitting a batch returns an identifier at once; the
//! batch is crawled in the background and polled with [`MetaCrawl::query`].

mod registry;

pub use registry::TaskRegistry;

use crate::config::CrawlerConfig;
use crate::crawler::{build_http_client, CrawlTask, DomainLimiters};
use crate::MetacrawlError;
use reqwest::Client;
use std::sync::Arc;
use uuid::Uuid;

/// Answer to a status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// No task has this identifier
    NotFound,

    /// The task has not finished; no partial results are returned
    InProgress,

    /// The task finished; carries the rendered CSV
    Completed(Vec<u8>),
}

/// The crawl service
pub struct MetaCrawl {
    config: CrawlerConfig,
    client: Client,
    limiters: Arc<DomainLimiters>,
    tasks: TaskRegistry,
}

impl MetaCrawl {
    /// Creates a service with no tasks
    ///
    /// # Returns
    ///
    /// * `Ok(MetaCrawl)` - The service
    /// * `Err(MetacrawlError::HttpClient)` - The HTTP client could not be built
    pub fn new(config: CrawlerConfig) -> Result<Self, MetacrawlError> {
        let client = build_http_client(&config)?;
        let limiters = Arc::new(DomainLimiters::new(config.domain_interval()));

        Ok(Self {
            config,
            client,
            limiters,
            tasks: TaskRegistry::new(),
        })
    }

    /// The limiter registry shared by every task of this service
    pub fn limiters(&self) -> &Arc<DomainLimiters> {
        &self.limiters
    }

    /// Splits a submission body into URL strings
    ///
    /// One URL per line; `\r\n` line endings and surrounding whitespace are
    /// tolerated and blank lines are skipped.
    pub fn parse_submission(body: &str) -> Result<Vec<String>, MetacrawlError> {
        let urls: Vec<String> = body
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if urls.is_empty() {
            return Err(MetacrawlError::EmptySubmission);
        }
        Ok(urls)
    }

    /// Parses a submission body and starts a task for it
    pub fn submit(&self, body: &str) -> Result<String, MetacrawlError> {
        let urls = Self::parse_submission(body)?;
        self.add_task(urls)
    }

    /// Starts a task crawling `urls` in the background
    ///
    /// Returns the new task's identifier without waiting for any fetch.
    /// Must be called from within a tokio runtime.
    pub fn add_task(&self, urls: Vec<String>) -> Result<String, MetacrawlError> {
        if urls.is_empty() {
            return Err(MetacrawlError::EmptySubmission);
        }

        let task = loop {
            let id = Uuid::new_v4().simple().to_string();
            let task = Arc::new(CrawlTask::new(
                id,
                urls.clone(),
                self.client.clone(),
                Arc::clone(&self.limiters),
                &self.config,
            ));
            if self.tasks.insert(Arc::clone(&task)) {
                break task;
            }
        };

        let id = task.id().to_string();
        tracing::info!("Accepted task {} with {} URLs", id, urls.len());

        tokio::spawn(async move {
            let id = task.id().to_string();
            if let Err(e) = task.process().await {
                tracing::error!("Task {} failed: {}", id, e);
            }
        });

        Ok(id)
    }

    pub fn task(&self, id: &str) -> Option<Arc<CrawlTask>> {
        self.tasks.get(id)
    }

    /// Removes a task; in-flight workers of a running task finish unobserved
    pub fn remove_task(&self, id: &str) -> Option<Arc<CrawlTask>> {
        self.tasks.remove(id)
    }

    /// Number of tasks currently registered
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Reports the state of a task, rendering its rows once it has completed
    ///
    /// With `delete`, a completed task is removed from the registry; a task
    /// that is still running is never removed.
    pub fn query(&self, id: &str, delete: bool) -> QueryOutcome {
        let Some(task) = self.task(id) else {
            return QueryOutcome::NotFound;
        };

        if !task.status().is_terminal() {
            return QueryOutcome::InProgress;
        }

        if delete {
            self.remove_task(id);
            tracing::debug!("Deleted task {}", id);
        }
        QueryOutcome::Completed(task.render())
    }
}
