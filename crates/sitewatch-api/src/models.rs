// Wire models for the monitoring backend.
//
// Response types decode leniently (nested records omit their parent id,
// child collections may be missing or null). Request types serialize
// exactly the fields the backend expects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

// ── RecordId ────────────────────────────────────────────────────────

/// Opaque identifier assigned by the backend to any record.
///
/// Integer primary keys today, but string keys are accepted so callers
/// never depend on the representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Numeric(i64),
    Opaque(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Opaque(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        match s.trim().parse::<i64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Opaque(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

// ── Reachability ────────────────────────────────────────────────────

/// Verdict of a single reachability probe. `true` on the wire means up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Reachability {
    Up,
    Down,
}

impl Reachability {
    pub fn is_up(self) -> bool {
        self == Self::Up
    }
}

impl From<bool> for Reachability {
    fn from(up: bool) -> Self {
        if up { Self::Up } else { Self::Down }
    }
}

impl From<Reachability> for bool {
    fn from(r: Reachability) -> Self {
        r.is_up()
    }
}

// ── Records ─────────────────────────────────────────────────────────

/// A monitored site as returned by `POST /monitored_sites/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: RecordId,
    pub site_name: String,
    pub site_url: String,
}

/// A polling interval attached to a site.
///
/// `site_url_id` is absent when the record is nested inside a
/// [`SiteAggregate`]; the parent implies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url_id: Option<RecordId>,
    /// Seconds between checks.
    pub time_interval: u32,
}

/// Outcome of one reachability check for a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url_id: Option<RecordId>,
    pub status: bool,
}

impl StatusRecord {
    pub fn reachability(&self) -> Reachability {
        Reachability::from(self.status)
    }
}

/// A site joined with its interval and status history
/// (`GET /monitored_sites/fetch`).
///
/// `intervals` and `statuses` are always present; a missing or `null`
/// field decodes as an empty sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAggregate {
    pub id: RecordId,
    pub site_name: String,
    pub site_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub intervals: Vec<CheckInterval>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub statuses: Vec<StatusRecord>,
}

impl SiteAggregate {
    /// A fresh aggregate for a site with no history.
    pub fn from_site(site: Site) -> Self {
        Self {
            id: site.id,
            site_name: site.site_name,
            site_url: site.site_url,
            intervals: Vec::new(),
            statuses: Vec::new(),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ── Requests ────────────────────────────────────────────────────────

/// Body of `POST /monitored_sites/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSiteRequest {
    pub site_url: String,
    pub site_name: String,
}

/// Body of `PATCH /monitored_sites/update`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSiteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl UpdateSiteRequest {
    pub fn is_empty(&self) -> bool {
        self.site_url.is_none() && self.site_name.is_none()
    }
}

/// Body of `POST /site_check_intervals/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIntervalRequest {
    pub site_url_id: RecordId,
    pub time_interval: u32,
}

/// Body of `PATCH /site_check_intervals/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateIntervalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_interval: Option<u32>,
}

/// Body of `POST /site_status/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStatusRequest {
    pub site_url_id: RecordId,
    pub status: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_id_parses_numeric_strings() {
        assert_eq!(RecordId::from("42"), RecordId::Numeric(42));
        assert_eq!(RecordId::from("abc"), RecordId::Opaque("abc".into()));
        assert_eq!(RecordId::from(7).to_string(), "7");
    }

    #[test]
    fn record_id_decodes_numbers_and_strings() {
        let n: RecordId = serde_json::from_value(json!(3)).unwrap();
        let s: RecordId = serde_json::from_value(json!("site-3")).unwrap();
        assert_eq!(n, RecordId::Numeric(3));
        assert_eq!(s, RecordId::Opaque("site-3".into()));
    }

    #[test]
    fn aggregate_missing_children_decode_as_empty() {
        let agg: SiteAggregate = serde_json::from_value(json!({
            "id": 1,
            "site_name": "A",
            "site_url": "http://a",
        }))
        .unwrap();
        assert!(agg.intervals.is_empty());
        assert!(agg.statuses.is_empty());
    }

    #[test]
    fn aggregate_null_children_decode_as_empty() {
        let agg: SiteAggregate = serde_json::from_value(json!({
            "id": 1,
            "site_name": "A",
            "site_url": "http://a",
            "intervals": null,
            "statuses": null,
        }))
        .unwrap();
        assert!(agg.intervals.is_empty());
        assert!(agg.statuses.is_empty());
    }

    #[test]
    fn nested_records_without_parent_id() {
        let agg: SiteAggregate = serde_json::from_value(json!({
            "id": 1,
            "site_name": "A",
            "site_url": "http://a",
            "intervals": [{"id": 10, "time_interval": 5}],
            "statuses": [{"id": 20, "status": true}, {"id": 21, "status": false}],
        }))
        .unwrap();
        assert_eq!(agg.intervals[0].time_interval, 5);
        assert_eq!(agg.intervals[0].site_url_id, None);
        assert_eq!(agg.statuses[0].reachability(), Reachability::Up);
        assert_eq!(agg.statuses[1].reachability(), Reachability::Down);
    }

    #[test]
    fn update_request_skips_unset_fields() {
        let body = serde_json::to_value(UpdateSiteRequest {
            site_name: Some("renamed".into()),
            site_url: None,
        })
        .unwrap();
        assert_eq!(body, json!({"site_name": "renamed"}));
    }

    #[test]
    fn reachability_display_and_bool() {
        assert_eq!(Reachability::Up.to_string(), "up");
        assert_eq!(Reachability::Down.to_string(), "down");
        assert_eq!("up".parse::<Reachability>().unwrap(), Reachability::Up);
        assert!(bool::from(Reachability::Up));
        assert_eq!(Reachability::from(false), Reachability::Down);
    }
}
