//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::{Input, Select};

use sitewatch_core::{DEFAULT_BACKEND_URL, ProbeMode};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

fn render_config_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg)
        .map(|s| s.trim_end().to_owned())
        .unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

/// Walk through backend URL and probe policy.
fn prompt_profile(profile_name: &str) -> Result<Profile, CliError> {
    let backend: String = Input::new()
        .with_prompt(format!("Backend URL for profile '{profile_name}'"))
        .default(DEFAULT_BACKEND_URL.into())
        .validate_with(|input: &String| -> Result<(), String> {
            config::parse_backend_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let modes = &[
        "Any HTTP response counts as up (recommended)",
        "Only 2xx responses count as up",
    ];
    let selection = Select::new()
        .with_prompt("Probe policy")
        .items(modes)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile::new(backend.trim());
    if selection == 1 {
        profile.probe_mode = Some(ProbeMode::SuccessStatus);
    }
    Ok(profile)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            let profile_name = global.profile.clone().unwrap_or_else(|| "default".into());

            let profile = if let Some(ref backend) = global.backend {
                config::parse_backend_url(backend)?;
                Profile::new(backend.trim())
            } else if std::io::stdin().is_terminal() {
                eprintln!("sitewatch configuration");
                eprintln!("   Config path: {}\n", config_path.display());
                prompt_profile(&profile_name)?
            } else {
                return Err(CliError::Validation {
                    field: "backend".into(),
                    reason: "pass --backend when running config init non-interactively".into(),
                });
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let written = config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("✓ Configuration written to {}", written.display());
                eprintln!("  Active profile: {profile_name}");
                eprintln!("\n  Try it: sitewatch sites list");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out =
                output::render_single(global.output, &cfg, render_config_toml, |c: &Config| {
                    c.default_profile.clone().unwrap_or_default()
                });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
