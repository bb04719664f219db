//! Per-domain request pacing
//!
//! Every domain gets exactly one [`PermitSource`] for the lifetime of the
//! [`DomainLimiters`] registry. All tasks and all concurrent fetches that
//! target the domain draw from that same source, so the effective request
//! rate to one domain never exceeds one request per interval regardless of
//! how many workers are running.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Emits one permit per fixed interval, the first one immediately
///
/// Ticks missed while nobody was waiting are not saved up: after an idle
/// period one permit is available at once and the rest are paced again.
#[derive(Debug)]
pub struct PermitSource {
    ticker: Mutex<Interval>,
}

impl PermitSource {
    /// Creates a permit source with the given period
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            ticker: Mutex::new(ticker),
        }
    }

    /// Waits until the next permit is available and consumes it
    pub async fn acquire(&self) {
        let mut ticker = self.ticker.lock().await;
        ticker.tick().await;
    }
}

/// Registry mapping a domain to its shared [`PermitSource`]
///
/// Sources are created lazily on first use and never removed.
#[derive(Debug)]
pub struct DomainLimiters {
    period: Duration,
    sources: RwLock<HashMap<String, Arc<PermitSource>>>,
}

impl DomainLimiters {
    /// Creates an empty registry whose sources all use `period`
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            sources: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the permit source for `domain`, creating it on first use
    ///
    /// Two concurrent first calls for the same domain get the same source.
    pub async fn permit_source(&self, domain: &str) -> Arc<PermitSource> {
        {
            let sources = self.sources.read().await;
            if let Some(source) = sources.get(domain) {
                return Arc::clone(source);
            }
        }

        let mut sources = self.sources.write().await;
        if let Some(source) = sources.get(domain) {
            return Arc::clone(source);
        }

        tracing::debug!("Creating permit source for domain {}", domain);
        let source = Arc::new(PermitSource::new(self.period));
        sources.insert(domain.to_string(), Arc::clone(&source));
        source
    }

    /// Waits for a permit to contact `domain`
    pub async fn acquire(&self, domain: &str) {
        self.permit_source(domain).await.acquire().await;
    }

    /// Number of domains seen so far
    pub async fn len(&self) -> usize {
        self.sources.read().await.len()
    }

    /// Returns true if no domain has been seen yet
    pub async fn is_empty(&self) -> bool {
        self.sources.read().await.is_empty()
    }
}
