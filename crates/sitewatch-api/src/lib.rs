// sitewatch-api: Async Rust client for the sitewatch monitoring backend

pub mod client;
pub mod error;
pub mod intervals;
pub mod models;
pub mod probe;
pub mod sites;
pub mod statuses;
pub mod transport;

pub use client::BackendClient;
pub use error::Error;
pub use models::{
    CheckInterval, CreateIntervalRequest, CreateSiteRequest, CreateStatusRequest, Reachability,
    RecordId, Site, SiteAggregate, StatusRecord, UpdateIntervalRequest, UpdateSiteRequest,
};
pub use probe::{HttpProber, ProbeMode};
pub use transport::{TlsMode, TransportConfig};
