// One-shot reachability probe
//
// Best-effort liveness only: a single GET, no retries, no body
// inspection. The verdict never surfaces an error to the caller.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::models::Reachability;
use crate::transport::TransportConfig;

/// How a completed request is turned into a verdict.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProbeMode {
    /// Any HTTP response at all counts as up; only transport errors are down.
    #[default]
    Transport,
    /// Additionally require a 2xx status.
    SuccessStatus,
}

/// Reachability prober backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpProber {
    http: reqwest::Client,
    mode: ProbeMode,
}

impl HttpProber {
    /// Build a prober from a `TransportConfig`.
    ///
    /// The transport timeout bounds each probe.
    pub fn new(transport: &TransportConfig, mode: ProbeMode) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            mode,
        })
    }

    /// Build a prober around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, mode: ProbeMode) -> Self {
        Self { http, mode }
    }

    /// Probe `target` once.
    ///
    /// Exactly one outbound request is made when `target` is a valid URL;
    /// an unparseable target is down without touching the network.
    pub async fn probe(&self, target: &str) -> Reachability {
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(e) => {
                info!(target, error = %e, "probe target is not a valid URL");
                return Reachability::Down;
            }
        };

        debug!(%url, mode = %self.mode, "probing");
        match self.http.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let verdict = match self.mode {
                    ProbeMode::Transport => Reachability::Up,
                    ProbeMode::SuccessStatus => Reachability::from(status.is_success()),
                };
                debug!(target, status = status.as_u16(), %verdict, "probe completed");
                verdict
            }
            Err(e) => {
                info!(target, error = %e, "probe failed");
                Reachability::Down
            }
        }
    }
}
