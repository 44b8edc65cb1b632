// ── Local site cache ──
//
// An ordered snapshot of site aggregates published through a `watch`
// channel. Every mutation swaps in a fresh `Arc<Vec<_>>`, so readers
// always see either the old or the new list, never a partial update.

use std::sync::Arc;

use tokio::sync::watch;

use sitewatch_api::{CheckInterval, RecordId, SiteAggregate, StatusRecord};

pub type SiteSnapshot = Arc<Vec<Arc<SiteAggregate>>>;

/// Client-side copy of the backend's site list.
///
/// Never authoritative: treat it as stale after any mutation until it is
/// re-fetched or patched locally.
pub struct SiteCache {
    snapshot: watch::Sender<SiteSnapshot>,
}

impl Default for SiteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteCache {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> SiteSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SiteSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn get(&self, id: &RecordId) -> Option<Arc<SiteAggregate>> {
        self.snapshot.borrow().iter().find(|s| &s.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    /// Replace the whole list. Last writer wins.
    pub fn replace(&self, sites: Vec<SiteAggregate>) -> SiteSnapshot {
        let next: SiteSnapshot = Arc::new(sites.into_iter().map(Arc::new).collect());
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::clone(&next));
        next
    }

    /// Insert a site, or replace the entry with the same id in place.
    pub fn upsert(&self, site: SiteAggregate) {
        self.snapshot.send_modify(|snap| {
            let mut sites: Vec<Arc<SiteAggregate>> = snap.as_ref().clone();
            match sites.iter_mut().find(|s| s.id == site.id) {
                Some(slot) => *slot = Arc::new(site),
                None => sites.push(Arc::new(site)),
            }
            *snap = Arc::new(sites);
        });
    }

    /// Remove the entry with `id`. Returns `true` if one was removed.
    pub fn remove(&self, id: &RecordId) -> bool {
        let mut removed = false;
        self.snapshot.send_if_modified(|snap| {
            if !snap.iter().any(|s| &s.id == id) {
                return false;
            }
            let sites: Vec<Arc<SiteAggregate>> =
                snap.iter().filter(|s| &s.id != id).cloned().collect();
            *snap = Arc::new(sites);
            removed = true;
            true
        });
        removed
    }

    /// Append an interval to a cached site's history.
    pub fn push_interval(&self, id: &RecordId, interval: CheckInterval) -> bool {
        self.patch(id, |site| site.intervals.push(interval))
    }

    /// Append a status to a cached site's history.
    pub fn push_status(&self, id: &RecordId, status: StatusRecord) -> bool {
        self.patch(id, |site| site.statuses.push(status))
    }

    fn patch(&self, id: &RecordId, f: impl FnOnce(&mut SiteAggregate)) -> bool {
        let mut f = Some(f);
        self.snapshot.send_if_modified(|snap| {
            let Some(pos) = snap.iter().position(|s| &s.id == id) else {
                return false;
            };
            let mut sites: Vec<Arc<SiteAggregate>> = snap.as_ref().clone();
            let mut site = sites[pos].as_ref().clone();
            if let Some(f) = f.take() {
                f(&mut site);
            }
            sites[pos] = Arc::new(site);
            *snap = Arc::new(sites);
            true
        })
    }
}
