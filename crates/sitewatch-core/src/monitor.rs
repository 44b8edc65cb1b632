// ── Monitoring workflow orchestrator ──
//
// Sequences backend calls and probes for the user-facing workflows and
// keeps the local `SiteCache` in step with what the backend reported.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;

use sitewatch_api::{
    BackendClient, CheckInterval, CreateIntervalRequest, CreateSiteRequest, CreateStatusRequest,
    HttpProber, Reachability, RecordId, Site, SiteAggregate, StatusRecord, UpdateSiteRequest,
};

use crate::backend::MonitorBackend;
use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::probe::Prober;
use crate::store::{SiteCache, SiteSnapshot};

/// Monitor wired to the real HTTP backend and prober.
pub type HttpMonitor = Monitor<BackendClient, HttpProber>;

/// Result of [`Monitor::register_site`].
///
/// `interval` and `status` are `None` when the corresponding create call
/// failed. The site itself always exists on the backend at this point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub site: Site,
    pub reachability: Reachability,
    pub interval: Option<CheckInterval>,
    pub status: Option<StatusRecord>,
}

impl Registration {
    /// Both child records were created.
    pub fn is_complete(&self) -> bool {
        self.interval.is_some() && self.status.is_some()
    }
}

/// Partial edit of a site's name and/or URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteUpdate {
    pub site_name: Option<String>,
    pub site_url: Option<String>,
}

impl SiteUpdate {
    fn into_request(self) -> Result<UpdateSiteRequest, CoreError> {
        let site_name = self.site_name.map(|n| validate_name(&n)).transpose()?;
        let site_url = self.site_url.map(|u| validate_url(&u)).transpose()?;
        let request = UpdateSiteRequest {
            site_url,
            site_name,
        };
        if request.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "nothing to update: pass a new name or URL".into(),
            });
        }
        Ok(request)
    }
}

/// The monitoring client's entry point.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Owns the backend, the
/// prober and the site cache; every workflow goes through here.
pub struct Monitor<B, P> {
    inner: Arc<MonitorInner<B, P>>,
}

struct MonitorInner<B, P> {
    backend: B,
    prober: P,
    cache: SiteCache,
}

impl<B, P> Clone for Monitor<B, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl HttpMonitor {
    /// Build a monitor talking HTTP to the backend in `config`.
    ///
    /// No request is sent until a workflow runs.
    pub fn connect(config: &MonitorConfig) -> Result<Self, CoreError> {
        let backend = BackendClient::new(config.backend_url.clone(), &config.backend_transport())?;
        let prober = HttpProber::new(&config.probe_transport(), config.probe.mode)?;
        debug!(backend = %config.backend_url, mode = %config.probe.mode, "monitor configured");
        Ok(Self::new(backend, prober))
    }
}

impl<B: MonitorBackend, P: Prober> Monitor<B, P> {
    pub fn new(backend: B, prober: P) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                backend,
                prober,
                cache: SiteCache::new(),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn prober(&self) -> &P {
        &self.inner.prober
    }

    // ── Workflows ────────────────────────────────────────────────

    /// Register a site, record its interval, probe it once and record the
    /// verdict.
    ///
    /// Only a failed site creation (or invalid input) fails the call. A
    /// failed interval or status create is logged and leaves the matching
    /// field of the [`Registration`] empty; nothing is rolled back.
    pub async fn register_site(
        &self,
        name: &str,
        url: &str,
        interval_secs: u32,
    ) -> Result<Registration, CoreError> {
        let site_name = validate_name(name)?;
        let site_url = validate_url(url)?;
        if interval_secs == 0 {
            return Err(CoreError::ValidationFailed {
                message: "check interval must be at least 1 second".into(),
            });
        }

        let backend = &self.inner.backend;

        let site = backend
            .create_site(&CreateSiteRequest {
                site_url: site_url.clone(),
                site_name,
            })
            .await
            .inspect_err(|e| error!(url = %site_url, error = %e, "site creation failed"))?;
        info!(site_id = %site.id, url = %site.site_url, "site created");

        let interval = match backend
            .create_interval(&CreateIntervalRequest {
                site_url_id: site.id.clone(),
                time_interval: interval_secs,
            })
            .await
        {
            Ok(interval) => Some(interval),
            Err(e) => {
                error!(site_id = %site.id, error = %e, "interval creation failed");
                None
            }
        };

        // Check the URL the caller submitted, not the one the backend echoed.
        let reachability = self.inner.prober.probe(&site_url).await;
        debug!(site_id = %site.id, %reachability, "initial probe");

        let status = match backend
            .create_status(&CreateStatusRequest {
                site_url_id: site.id.clone(),
                status: reachability.is_up(),
            })
            .await
        {
            Ok(status) => Some(status),
            Err(e) => {
                error!(site_id = %site.id, error = %e, "status creation failed");
                None
            }
        };

        let registration = Registration {
            site,
            reachability,
            interval,
            status,
        };
        self.refresh_after_register(&registration).await;
        Ok(registration)
    }

    /// Delete a site. The cache drops the entry only if the backend
    /// confirmed the deletion.
    pub async fn delete_site(&self, id: &RecordId) -> Result<(), CoreError> {
        match self.inner.backend.delete_site(id).await {
            Ok(()) => {
                if !self.inner.cache.remove(id) {
                    debug!(site_id = %id, "deleted site was not cached");
                }
                info!(site_id = %id, "site deleted");
                Ok(())
            }
            Err(e) => {
                error!(site_id = %id, error = %e, "site deletion failed");
                Err(e)
            }
        }
    }

    /// Fetch every site and replace the cache with the result.
    ///
    /// On failure the previous cache contents are kept.
    pub async fn list_sites(&self) -> Result<SiteSnapshot, CoreError> {
        match self.inner.backend.list_sites().await {
            Ok(sites) => {
                debug!(count = sites.len(), "sites fetched");
                Ok(self.inner.cache.replace(sites))
            }
            Err(e) => {
                error!(error = %e, "site list fetch failed");
                Err(e)
            }
        }
    }

    /// Fetch one site and refresh its cache entry.
    pub async fn get_site(&self, id: &RecordId) -> Result<Arc<SiteAggregate>, CoreError> {
        let site = self
            .inner
            .backend
            .get_site(id)
            .await
            .inspect_err(|e| warn!(site_id = %id, error = %e, "site fetch failed"))?;
        self.inner.cache.upsert(site);
        self.inner
            .cache
            .get(id)
            .ok_or_else(|| CoreError::SiteNotFound { id: id.to_string() })
    }

    /// Rename a site or point it at a new URL.
    pub async fn update_site(
        &self,
        id: &RecordId,
        update: SiteUpdate,
    ) -> Result<Arc<SiteAggregate>, CoreError> {
        let request = update.into_request()?;
        let mut updated = self
            .inner
            .backend
            .update_site(id, &request)
            .await
            .inspect_err(|e| error!(site_id = %id, error = %e, "site update failed"))?;

        // Some backends answer with the bare site; keep the cached history.
        if let Some(cached) = self.inner.cache.get(id) {
            if updated.intervals.is_empty() {
                updated.intervals.clone_from(&cached.intervals);
            }
            if updated.statuses.is_empty() {
                updated.statuses.clone_from(&cached.statuses);
            }
        }
        info!(site_id = %id, "site updated");
        self.inner.cache.upsert(updated);
        self.inner
            .cache
            .get(id)
            .ok_or_else(|| CoreError::SiteNotFound { id: id.to_string() })
    }

    /// Record a new check interval for an existing site.
    ///
    /// Intervals are history: this appends a record, the latest one wins.
    pub async fn set_interval(
        &self,
        id: &RecordId,
        interval_secs: u32,
    ) -> Result<CheckInterval, CoreError> {
        if interval_secs == 0 {
            return Err(CoreError::ValidationFailed {
                message: "check interval must be at least 1 second".into(),
            });
        }
        let site = self.resolve_site(id).await?;

        let interval = self
            .inner
            .backend
            .create_interval(&CreateIntervalRequest {
                site_url_id: site.id.clone(),
                time_interval: interval_secs,
            })
            .await
            .inspect_err(|e| error!(site_id = %id, error = %e, "interval creation failed"))?;

        self.inner.cache.push_interval(&site.id, interval.clone());
        info!(site_id = %id, interval_secs, "check interval changed");
        Ok(interval)
    }

    /// Probe a site once and record the verdict.
    pub async fn check_site(&self, id: &RecordId) -> Result<Reachability, CoreError> {
        let site = self.resolve_site(id).await?;
        let reachability = self.inner.prober.probe(&site.site_url).await;

        let status = self
            .inner
            .backend
            .create_status(&CreateStatusRequest {
                site_url_id: site.id.clone(),
                status: reachability.is_up(),
            })
            .await
            .inspect_err(|e| error!(site_id = %id, error = %e, "status creation failed"))?;

        self.inner.cache.push_status(&site.id, status);
        debug!(site_id = %id, %reachability, "site checked");
        Ok(reachability)
    }

    // ── Cache accessors ──────────────────────────────────────────

    /// Current cached site list.
    pub fn sites_snapshot(&self) -> SiteSnapshot {
        self.inner.cache.snapshot()
    }

    /// Subscribe to cache updates.
    pub fn subscribe(&self) -> watch::Receiver<SiteSnapshot> {
        self.inner.cache.subscribe()
    }

    pub fn cached_site(&self, id: &RecordId) -> Option<Arc<SiteAggregate>> {
        self.inner.cache.get(id)
    }

    // ── Internals ────────────────────────────────────────────────

    async fn resolve_site(&self, id: &RecordId) -> Result<Arc<SiteAggregate>, CoreError> {
        match self.inner.cache.get(id) {
            Some(site) => Ok(site),
            None => self.get_site(id).await,
        }
    }

    async fn refresh_after_register(&self, registration: &Registration) {
        match self.inner.backend.list_sites().await {
            Ok(sites) => {
                self.inner.cache.replace(sites);
            }
            Err(e) => {
                warn!(error = %e, "refresh after registration failed; merging locally");
                let mut aggregate = SiteAggregate::from_site(registration.site.clone());
                aggregate.intervals.extend(registration.interval.clone());
                aggregate.statuses.extend(registration.status.clone());
                self.inner.cache.upsert(aggregate);
            }
        }
    }
}

// ── Input validation ─────────────────────────────────────────────────

fn validate_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::ValidationFailed {
            message: "site name must not be empty".into(),
        });
    }
    Ok(name.to_owned())
}

fn validate_url(raw: &str) -> Result<String, CoreError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| CoreError::ValidationFailed {
        message: format!("invalid site URL '{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CoreError::ValidationFailed {
            message: format!("site URL must be an absolute http(s) URL, got '{raw}'"),
        });
    }
    Ok(raw.to_owned())
}
