//! Clap derive structures for the `sitewatch` CLI.
//!
//! Defines the command tree, global flags, and shared types. Also compiled
//! by `build.rs` for man pages, so it may only depend on clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitewatch -- register websites and track whether they are up
#[derive(Debug, Parser)]
#[command(
    name = "sitewatch",
    version,
    about = "Register websites and track their reachability",
    long_about = "A client for a site-monitoring backend.\n\n\
        Registers sites with a check interval, probes them, records each\n\
        verdict on the backend, and re-checks them on their interval.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "SITEWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "SITEWATCH_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SITEWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (backend and probes)
    #[arg(long, short = 'k', env = "SITEWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Backend request timeout in seconds (overrides profile)
    #[arg(long, env = "SITEWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, inspect and remove monitored sites
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Re-check every site on its interval until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List all sites with their interval and status history
    #[command(alias = "ls")]
    List,

    /// Show one site
    #[command(alias = "get")]
    Show {
        /// Site ID
        id: String,
    },

    /// Register a site, record its interval and probe it once
    #[command(alias = "register")]
    Add {
        /// Display name
        name: String,

        /// Absolute http(s) URL to monitor
        url: String,

        /// Seconds between checks
        #[arg(long, short = 'i', default_value = "60")]
        interval: u32,
    },

    /// Rename a site or change its URL
    Update {
        /// Site ID
        id: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Record a new check interval for a site
    Interval {
        /// Site ID
        id: String,

        /// Seconds between checks
        seconds: u32,
    },

    /// Probe a site now and record the result
    Check {
        /// Site ID
        id: String,
    },

    /// Delete a site
    #[command(alias = "rm")]
    Delete {
        /// Site ID
        id: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Check every site once and exit
    #[arg(long)]
    pub once: bool,

    /// Seconds between checks for sites without a recorded interval
    #[arg(long)]
    pub default_interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file (interactive unless --backend is given)
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_defaults_interval() {
        let cli = Cli::try_parse_from(["sitewatch", "sites", "add", "A", "http://a"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Command::Sites(SitesArgs {
                command: SitesCommand::Add { interval, .. },
            }) => assert_eq!(interval, 60),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
