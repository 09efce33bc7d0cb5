use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, Extra};
use crate::client::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default)]
    pub organization: Option<i64>,
    /// GeoJSON polygon; rendering is left to the caller
    #[serde(default)]
    pub polygon_json: Option<Value>,
    #[serde(default)]
    pub center_point: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Geofence {
    const PATH: &'static str = "geofences";
    const LABEL: &'static str = "geofences";
    const COLUMNS: &'static [&'static str] = &["id", "name", "active", "organization"];
}
