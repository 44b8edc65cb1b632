//! Monitoring workflows between `sitewatch-api` and the CLI.
//!
//! - **[`Monitor`]**: orchestrates registration, listing, deletion and the
//!   single-site operations, logging failures at the workflow boundary and
//!   keeping the local [`SiteCache`] consistent with backend responses.
//!
//! - **[`SiteCache`]**: ordered snapshot of site aggregates behind a
//!   `tokio::sync::watch` channel. Readers get cheap `Arc` snapshots.
//!
//! - **[`Watcher`]**: re-probes every site on its latest interval until
//!   cancelled, broadcasting a [`CheckOutcome`] per check.
//!
//! - **[`view`]**: pure formatting of aggregates into display rows.
//!
//! The backend and the prober sit behind the [`MonitorBackend`] and
//! [`Prober`] traits so workflows can be exercised without a network.

pub mod backend;
pub mod config;
pub mod error;
pub mod monitor;
pub mod probe;
pub mod store;
pub mod view;
pub mod watcher;

pub use backend::MonitorBackend;
pub use config::{DEFAULT_BACKEND_URL, MonitorConfig, ProbeConfig, TlsVerification};
pub use error::CoreError;
pub use monitor::{HttpMonitor, Monitor, Registration, SiteUpdate};
pub use probe::Prober;
pub use store::{SiteCache, SiteSnapshot};
pub use view::{SiteView, format_interval, format_status, latest_status, summarize};
pub use watcher::{CheckOutcome, Watcher};

// Wire models, re-exported so consumers need only this crate.
pub use sitewatch_api::{
    CheckInterval, ProbeMode, Reachability, RecordId, Site, SiteAggregate, StatusRecord,
};
