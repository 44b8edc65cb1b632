// ── Aggregate view model ──
//
// Pure formatting helpers that turn site aggregates into display rows.
// No I/O; the CLI decides how to render them.

use serde::Serialize;

use sitewatch_api::{CheckInterval, Reachability, SiteAggregate, StatusRecord};

/// Placeholder for an empty history column.
pub const EMPTY: &str = "—";

/// Join formatted records with `", "` in slice order, or [`EMPTY`].
pub fn summarize<T>(records: &[T], formatter: impl Fn(&T) -> String) -> String {
    if records.is_empty() {
        return EMPTY.to_owned();
    }
    records.iter().map(formatter).collect::<Vec<_>>().join(", ")
}

/// Interval as whole seconds.
pub fn format_interval(interval: &CheckInterval) -> String {
    interval.time_interval.to_string()
}

pub fn format_status(status: &StatusRecord) -> String {
    status.reachability().to_string()
}

/// Verdict of the most recent status record, if any.
pub fn latest_status(site: &SiteAggregate) -> Option<Reachability> {
    site.statuses.last().map(StatusRecord::reachability)
}

/// One display row per site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteView {
    pub id: String,
    pub name: String,
    pub url: String,
    pub intervals: String,
    pub statuses: String,
}

impl From<&SiteAggregate> for SiteView {
    fn from(site: &SiteAggregate) -> Self {
        Self {
            id: site.id.to_string(),
            name: site.site_name.clone(),
            url: site.site_url.clone(),
            intervals: summarize(&site.intervals, format_interval),
            statuses: summarize(&site.statuses, format_status),
        }
    }
}
