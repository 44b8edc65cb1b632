// ── Periodic re-check loop ──
//
// One task per site, each sleeping for the site's latest interval and
// then recording a fresh probe. Outcomes fan out on a broadcast channel.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sitewatch_api::{Reachability, RecordId, SiteAggregate};

use crate::backend::MonitorBackend;
use crate::error::CoreError;
use crate::monitor::Monitor;
use crate::probe::Prober;
use crate::view::latest_status;

const OUTCOME_CHANNEL_SIZE: usize = 256;

/// Result of one scheduled check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub site_id: RecordId,
    pub site_name: String,
    /// `None` when the check could not be recorded.
    pub reachability: Option<Reachability>,
    /// Verdict of the previous status record, if one existed.
    pub previous: Option<Reachability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutcome {
    /// The verdict flipped relative to the previous record.
    pub fn changed(&self) -> bool {
        matches!((self.previous, self.reachability), (Some(a), Some(b)) if a != b)
    }
}

/// Re-probes every known site on its own interval until cancelled.
pub struct Watcher<B, P> {
    monitor: Monitor<B, P>,
    default_interval: Duration,
    outcomes: broadcast::Sender<CheckOutcome>,
}

impl<B, P> Clone for Watcher<B, P> {
    fn clone(&self) -> Self {
        Self {
            monitor: self.monitor.clone(),
            default_interval: self.default_interval,
            outcomes: self.outcomes.clone(),
        }
    }
}

impl<B, P> Watcher<B, P>
where
    B: MonitorBackend + 'static,
    P: Prober + 'static,
{
    /// `default_interval` applies to sites with no interval recorded.
    pub fn new(monitor: Monitor<B, P>, default_interval: Duration) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_SIZE);
        Self {
            monitor,
            default_interval,
            outcomes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CheckOutcome> {
        self.outcomes.subscribe()
    }

    /// Check every site once, in backend order.
    pub async fn run_once(&self) -> Result<Vec<CheckOutcome>, CoreError> {
        let sites = self.monitor.list_sites().await?;
        let mut outcomes = Vec::with_capacity(sites.len());
        for site in &*sites {
            outcomes.push(self.check(site).await);
        }
        Ok(outcomes)
    }

    /// Schedule every site currently on the backend and keep checking
    /// until `cancel` fires.
    ///
    /// Sites registered after the loop starts are not picked up.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), CoreError> {
        let sites = self.monitor.list_sites().await?;
        info!(count = sites.len(), "watching sites");

        let mut tasks = JoinSet::new();
        for site in &*sites {
            let watcher = self.clone();
            let cancel = cancel.clone();
            let id = site.id.clone();
            tasks.spawn(async move { watcher.site_loop(id, cancel).await });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "site watch task ended abnormally");
            }
        }
        debug!("watcher stopped");
        Ok(())
    }

    async fn site_loop(&self, id: RecordId, cancel: CancellationToken) {
        loop {
            let Some(site) = self.monitor.cached_site(&id) else {
                debug!(site_id = %id, "site left the cache, no longer watched");
                break;
            };
            let period = self.interval_for(&site);

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(period) => {
                    self.check(&site).await;
                }
            }
        }
    }

    /// Latest recorded interval, else the default.
    fn interval_for(&self, site: &SiteAggregate) -> Duration {
        site.intervals
            .last()
            .map_or(self.default_interval, |i| {
                Duration::from_secs(u64::from(i.time_interval))
            })
    }

    async fn check(&self, site: &SiteAggregate) -> CheckOutcome {
        let previous = self
            .monitor
            .cached_site(&site.id)
            .and_then(|s| latest_status(&s));

        let outcome = match self.monitor.check_site(&site.id).await {
            Ok(reachability) => CheckOutcome {
                site_id: site.id.clone(),
                site_name: site.site_name.clone(),
                reachability: Some(reachability),
                previous,
                error: None,
            },
            Err(e) => {
                warn!(site_id = %site.id, error = %e, "scheduled check failed");
                CheckOutcome {
                    site_id: site.id.clone(),
                    site_name: site.site_name.clone(),
                    reachability: None,
                    previous,
                    error: Some(e.to_string()),
                }
            }
        };

        if outcome.changed() {
            match outcome.reachability {
                Some(Reachability::Down) => {
                    warn!(site_id = %site.id, url = %site.site_url, "site went down");
                }
                Some(Reachability::Up) => {
                    info!(site_id = %site.id, url = %site.site_url, "site recovered");
                }
                None => {}
            }
        }

        // No receivers is fine.
        let _ = self.outcomes.send(outcome.clone());
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    use super::*;
    use crate::monitor::tests::{FakeBackend, FixedProber};

    type TestWatcher = Watcher<FakeBackend, FixedProber>;

    fn watcher(backend: FakeBackend, verdict: Reachability, default_secs: u64) -> TestWatcher {
        let monitor = Monitor::new(backend, FixedProber::new(verdict));
        Watcher::new(monitor, Duration::from_secs(default_secs))
    }

    #[tokio::test]
    async fn run_once_checks_every_site_in_order() {
        let w = watcher(FakeBackend::with_sites(&[2, 1]), Reachability::Up, 60);

        let outcomes = w.run_once().await.unwrap();

        let ids: Vec<String> = outcomes.iter().map(|o| o.site_id.to_string()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert!(
            outcomes
                .iter()
                .all(|o| o.reachability == Some(Reachability::Up))
        );
        assert_eq!(w.monitor.backend().status_requests().len(), 2);
    }

    #[tokio::test]
    async fn run_once_reports_transitions() {
        let w = watcher(FakeBackend::with_sites(&[1]), Reachability::Up, 60);
        w.run_once().await.unwrap();

        w.monitor.prober().set(Reachability::Down);
        let outcomes = w.run_once().await.unwrap();

        assert_eq!(outcomes[0].previous, Some(Reachability::Up));
        assert_eq!(outcomes[0].reachability, Some(Reachability::Down));
        assert!(outcomes[0].changed());
    }

    #[tokio::test]
    async fn failed_check_is_reported_not_fatal() {
        let backend = FakeBackend::with_sites(&[1, 2]);
        backend.fail(|f| f.create_status = true);
        let w = watcher(backend, Reachability::Up, 60);

        let outcomes = w.run_once().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.reachability.is_none()));
        assert!(outcomes.iter().all(|o| o.error.is_some()));
        assert!(!outcomes[0].changed());
    }

    #[tokio::test]
    async fn run_fails_when_sites_cannot_be_listed() {
        let backend = FakeBackend::default();
        backend.fail(|f| f.list = true);
        let w = watcher(backend, Reachability::Up, 60);

        let err = w.run(CancellationToken::new()).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test(start_paused = true)]
    async fn run_uses_latest_interval() {
        let backend = FakeBackend::with_sites(&[1]);
        backend.add_interval(1, 300);
        backend.add_interval(1, 10);
        let w = watcher(backend, Reachability::Up, 60);
        let mut rx = w.subscribe();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let handle = tokio::spawn({
            let w = w.clone();
            let cancel = cancel.clone();
            async move { w.run(cancel).await }
        });

        let first = rx.recv().await.unwrap();
        assert_eq!(first.site_id, RecordId::from(1));
        assert_eq!(start.elapsed(), Duration::from_secs(10));

        rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(20));

        cancel.cancel();
        handle.await.unwrap().unwrap();
        assert_eq!(w.monitor.prober().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_falls_back_to_default_interval() {
        let w = watcher(FakeBackend::with_sites(&[1]), Reachability::Down, 45);
        let mut rx = w.subscribe();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let handle = tokio::spawn({
            let w = w.clone();
            let cancel = cancel.clone();
            async move { w.run(cancel).await }
        });

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.reachability, Some(Reachability::Down));
        assert_eq!(start.elapsed(), Duration::from_secs(45));

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn cancelled_run_returns_promptly() {
        let w = watcher(FakeBackend::with_sites(&[1, 2, 3]), Reachability::Up, 3600);
        let cancel = CancellationToken::new();
        cancel.cancel();

        w.run(cancel).await.unwrap();
        assert_eq!(w.monitor.prober().calls.load(Ordering::SeqCst), 0);
    }
}
