//! Configuration for the sitewatch CLI.
//!
//! TOML profiles at the platform config path, merged with environment
//! overrides, and translation to `sitewatch_core::MonitorConfig`. The CLI
//! layers its own flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitewatch_core::{DEFAULT_BACKEND_URL, MonitorConfig, ProbeConfig, ProbeMode, TlsVerification};

/// Environment variable that points at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "SITEWATCH_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the override, else `default_profile`,
    /// else `"default"`.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    /// Backend request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Probe timeout in seconds.
    #[serde(default = "default_timeout")]
    pub probe_timeout: u64,

    #[serde(default)]
    pub probe_mode: ProbeMode,

    /// Watch period in seconds for sites without a recorded interval.
    #[serde(default = "default_interval")]
    pub default_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
            probe_timeout: default_timeout(),
            probe_mode: ProbeMode::default(),
            default_interval: default_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_interval() -> u64 {
    60
}

/// A named backend profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://127.0.0.1:8000").
    pub backend: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_mode: Option<ProbeMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_interval: Option<u64>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
}

impl Profile {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            timeout: None,
            probe_timeout: None,
            probe_mode: None,
            default_interval: None,
            ca_cert: None,
            insecure: None,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$SITEWATCH_CONFIG`, else the platform
/// config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "sitewatch", "sitewatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitewatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. Precedence: env over file over defaults.
///
/// Nested keys use a double underscore, e.g.
/// `SITEWATCH_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SITEWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse and check a backend URL.
pub fn parse_backend_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "backend".into(),
            reason: format!("expected an http or https URL, got '{raw}'"),
        });
    }
    Ok(url)
}

/// Build a `MonitorConfig` from a profile and the global defaults, with
/// no CLI overrides applied.
pub fn profile_to_monitor_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    let backend_url = parse_backend_url(&profile.backend)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let default_interval = profile.default_interval.unwrap_or(defaults.default_interval);
    if default_interval == 0 {
        return Err(ConfigError::Validation {
            field: "default_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    Ok(MonitorConfig {
        backend_url,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        probe: ProbeConfig {
            timeout: Duration::from_secs(profile.probe_timeout.unwrap_or(defaults.probe_timeout)),
            mode: profile.probe_mode.unwrap_or(defaults.probe_mode),
        },
        default_interval: Duration::from_secs(default_interval),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 10

[profiles.lab]
backend = "http://lab.test:8000"
probe_mode = "success-status"

[profiles.prod]
backend = "https://monitor.example.com"
ca_cert = "/etc/ssl/monitor.pem"
timeout = 5
"#;

    // Env is process-global; every test that loads config runs in a Jail.

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;

            let cfg = load_config_from(&jail.directory().join("config.toml"))
                .map_err(|e| e.to_string())?;

            assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
            assert_eq!(cfg.defaults.timeout, 10);
            assert_eq!(cfg.defaults.probe_timeout, 30);
            assert_eq!(cfg.profiles.len(), 2);
            assert_eq!(
                cfg.profiles["lab"].probe_mode,
                Some(ProbeMode::SuccessStatus)
            );
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("SITEWATCH_DEFAULTS__TIMEOUT", "3");
            jail.set_env("SITEWATCH_DEFAULT_PROFILE", "prod");

            let cfg = load_config_from(&jail.directory().join("config.toml"))
                .map_err(|e| e.to_string())?;

            assert_eq!(cfg.defaults.timeout, 3);
            assert_eq!(cfg.default_profile.as_deref(), Some("prod"));
            assert_eq!(cfg.profiles["prod"].timeout, Some(5));
            Ok(())
        });
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://127.0.0.1:9000"));
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("http://127.0.0.1:9000"));
        assert!(!written.contains("ca_cert"));
        assert!(written.contains("probe_timeout"));
        assert!(!written.contains("output"));
        assert!(!written.contains("color"));

        Jail::expect_with(|_| {
            let loaded = load_config_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(loaded, cfg);
            Ok(())
        });
    }

    #[test]
    fn profile_name_resolution() {
        let mut cfg = Config::default();
        assert_eq!(cfg.profile_name(None), "default");
        assert_eq!(cfg.profile_name(Some("x")), "x");

        cfg.default_profile = Some("lab".into());
        assert_eq!(cfg.profile_name(None), "lab");

        assert!(matches!(
            cfg.profile("lab"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_translation_applies_defaults() {
        let defaults = Defaults {
            timeout: 12,
            ..Defaults::default()
        };
        let mut profile = Profile::new("http://lab.test:8000");
        profile.probe_timeout = Some(4);

        let mc = profile_to_monitor_config(&profile, &defaults).unwrap();

        assert_eq!(mc.backend_url.as_str(), "http://lab.test:8000/");
        assert_eq!(mc.timeout, Duration::from_secs(12));
        assert_eq!(mc.probe.timeout, Duration::from_secs(4));
        assert_eq!(mc.probe.mode, ProbeMode::Transport);
        assert_eq!(mc.tls, TlsVerification::SystemDefaults);
        assert_eq!(mc.default_interval, Duration::from_secs(60));
    }

    #[test]
    fn tls_selection() {
        let defaults = Defaults::default();

        let mut profile = Profile::new("https://m.test");
        profile.ca_cert = Some(PathBuf::from("/ca.pem"));
        let mc = profile_to_monitor_config(&profile, &defaults).unwrap();
        assert_eq!(mc.tls, TlsVerification::CustomCa(PathBuf::from("/ca.pem")));

        profile.insecure = Some(true);
        let mc = profile_to_monitor_config(&profile, &defaults).unwrap();
        assert_eq!(mc.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn bad_backend_url_is_rejected() {
        let defaults = Defaults::default();
        for raw in ["not a url", "ftp://files.test"] {
            let err = profile_to_monitor_config(&Profile::new(raw), &defaults).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "backend"));
        }
    }
}
