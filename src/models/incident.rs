use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Extra;
use crate::client::{AccessPolicy, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub incident_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub geofence: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

// Officers and some sub-admins are not allowed to read incidents
impl Resource for Incident {
    const PATH: &'static str = "incidents";
    const LABEL: &'static str = "incidents";
    const COLUMNS: &'static [&'static str] = &["id", "title", "severity", "status", "created_at"];
    const ACCESS: AccessPolicy = AccessPolicy::Degraded;
}
