//! CLI configuration: thin wrapper around `sitewatch_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--backend, --timeout, --insecure, --profile).

use std::time::Duration;

use sitewatch_core::{MonitorConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use sitewatch_config::{
    Config, Profile, config_path, load_config, load_config_or_default, parse_backend_url,
    profile_to_monitor_config, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Build a `MonitorConfig` from the config file, the active profile and
/// CLI overrides.
///
/// Works without a config file when `--backend` is given.
pub fn resolve_monitor_config(global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let base = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None => match global.backend {
            Some(ref backend) => Profile::new(backend.clone()),
            None if global.profile.is_some() => {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            None => {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
        },
    };

    let mut mc = profile_to_monitor_config(&base, &cfg.defaults)?;
    apply_overrides(&mut mc, global)?;
    Ok(mc)
}

/// Flag > env > profile.
fn apply_overrides(mc: &mut MonitorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref backend) = global.backend {
        mc.backend_url = parse_backend_url(backend)?;
    }
    if let Some(secs) = global.timeout {
        mc.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        mc.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(())
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
