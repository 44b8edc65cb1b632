// ── Prober seam ──

use async_trait::async_trait;

use sitewatch_api::{HttpProber, Reachability};

/// Single best-effort liveness check. Never fails; errors mean down.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Reachability;
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Reachability {
        HttpProber::probe(self, url).await
    }
}
