use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{null_as_default, Extra};
use crate::client::{AccessPolicy, Resource};

/// Role reported by the backend. Roles this client does not know keep their
/// raw name so the cached user is written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserRole {
    SuperAdmin,
    SubAdmin,
    Officer,
    #[default]
    User,
    Unknown(String),
}

/// Roles allowed into the admin views
pub const ADMIN_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::SubAdmin];

/// Views only a super admin may open
pub const SUPER_ADMIN_ONLY: &[UserRole] = &[UserRole::SuperAdmin];

impl UserRole {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "SUPER_ADMIN" => UserRole::SuperAdmin,
            "SUB_ADMIN" => UserRole::SubAdmin,
            "OFFICER" => UserRole::Officer,
            "USER" => UserRole::User,
            other => UserRole::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::SubAdmin => "SUB_ADMIN",
            UserRole::Officer => "OFFICER",
            UserRole::User => "USER",
            UserRole::Unknown(raw) => raw,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::SubAdmin)
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(UserRole::parse(&raw))
    }
}

/// Cached copy of the signed-in user, also the row type of the Users resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: UserRole,
    #[serde(default = "default_active", deserialize_with = "active_or_default")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_active() -> bool {
    true
}

fn active_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_active))
}

impl Resource for UserRecord {
    const PATH: &'static str = "users";
    const LABEL: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "username", "email", "role", "is_active"];
    const ACCESS: AccessPolicy = AccessPolicy::Strict;
}
