// ── Runtime monitor configuration ──
//
// These types describe *how* to reach the backend and probe sites.
// They never touch disk: the CLI builds a `MonitorConfig` and hands it in.

use std::time::Duration;

use sitewatch_api::ProbeMode;
use sitewatch_api::transport::{TlsMode, TransportConfig};
use url::Url;

/// Where a locally run backend listens by default.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Reachability probe settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Upper bound for a single probe request.
    ///
    /// Defaults to 30 s. The HTTP client alone would wait indefinitely on a
    /// site that accepts the connection but never answers; raise this in
    /// the profile to get close to that behaviour.
    pub timeout: Duration,
    pub mode: ProbeMode,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            mode: ProbeMode::Transport,
        }
    }
}

/// Configuration for talking to one monitoring backend.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Backend root URL (e.g., `http://127.0.0.1:8000`).
    pub backend_url: Url,
    /// TLS verification strategy for backend calls.
    pub tls: TlsVerification,
    /// Backend request timeout.
    pub timeout: Duration,
    pub probe: ProbeConfig,
    /// Re-check period for sites that have no interval recorded.
    pub default_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            probe: ProbeConfig::default(),
            default_interval: Duration::from_secs(60),
        }
    }
}

impl MonitorConfig {
    pub(crate) fn backend_transport(&self) -> TransportConfig {
        TransportConfig {
            tls: tls_to_transport(&self.tls),
            timeout: self.timeout,
        }
    }

    /// Probes verify certificates with the same policy as backend calls.
    pub(crate) fn probe_transport(&self) -> TransportConfig {
        self.backend_transport().with_timeout(self.probe.timeout)
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_site_timeout_is_bounded() {
        let mc = MonitorConfig::default();
        assert_eq!(mc.probe.timeout, Duration::from_secs(30));
        assert_eq!(mc.probe_transport().timeout, Duration::from_secs(30));
    }

    #[test]
    fn site_transport_keeps_backend_tls() {
        let mc = MonitorConfig {
            tls: TlsVerification::DangerAcceptInvalid,
            timeout: Duration::from_secs(5),
            probe: ProbeConfig {
                timeout: Duration::from_secs(2),
                mode: ProbeMode::SuccessStatus,
            },
            ..MonitorConfig::default()
        };
        let transport = mc.probe_transport();
        assert_eq!(transport.timeout, Duration::from_secs(2));
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
    }
}
