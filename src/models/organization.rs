use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, Extra, UserRole, SUPER_ADMIN_ONLY};
use crate::client::{AccessPolicy, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

// Only super admins may list organizations
impl Resource for Organization {
    const PATH: &'static str = "organizations";
    const LABEL: &'static str = "organizations";
    const COLUMNS: &'static [&'static str] = &["id", "name", "created_at"];
    const ACCESS: AccessPolicy = AccessPolicy::Degraded;
    const ROLES: &'static [UserRole] = SUPER_ADMIN_ONLY;
}
