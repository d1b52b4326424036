use crate::model::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized owner details returned to trackers on the durable path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub name: String,
    pub phone: String,
}

/// Answer to a "where are they now" query
///
/// Served from the live cache while the session has one; otherwise from
/// the durable record, in which case `observed_at` is unknown and the
/// owner summary is filled in when the directory has the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationReport {
    pub location: Option<GeoPoint>,

    /// Instant the device claims the position was observed (live path only)
    pub observed_at: Option<DateTime<Utc>>,

    pub last_updated: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
}
