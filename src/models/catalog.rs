// Smaller admin resources that only need list/get/create/update/delete
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, Extra, UserRole, SUPER_ADMIN_ONLY};
use crate::client::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Notification {
    const PATH: &'static str = "notifications";
    const LABEL: &'static str = "notifications";
    const COLUMNS: &'static [&'static str] =
        &["id", "title", "notification_type", "status", "sent_at"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub geofence: Option<i64>,
    #[serde(default)]
    pub organization: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Officer {
    const PATH: &'static str = "officers";
    const LABEL: &'static str = "officers";
    const COLUMNS: &'static [&'static str] = &["id", "name", "contact", "is_active"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promocode {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Promocode {
    const PATH: &'static str = "promocodes";
    const LABEL: &'static str = "promocodes";
    const COLUMNS: &'static [&'static str] = &["id", "code", "discount_percentage", "is_active"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Report {
    const PATH: &'static str = "reports";
    const LABEL: &'static str = "reports";
    const COLUMNS: &'static [&'static str] = &["id", "title", "report_type", "status"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAdmin {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub organization: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for SubAdmin {
    const PATH: &'static str = "subadmins";
    const LABEL: &'static str = "sub-admins";
    const COLUMNS: &'static [&'static str] =
        &["id", "username", "email", "organization", "is_active"];
    const ROLES: &'static [UserRole] = SUPER_ADMIN_ONLY;
}

/// End-user profile as seen by admins (plan, phone, activity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for UserDetail {
    const PATH: &'static str = "user-details";
    const LABEL: &'static str = "user details";
    const COLUMNS: &'static [&'static str] = &["id", "username", "plan_type", "is_active"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReply {
    pub id: i64,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for UserReply {
    const PATH: &'static str = "user-replies";
    const LABEL: &'static str = "user replies";
    const COLUMNS: &'static [&'static str] = &["id", "user", "message", "created_at"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountEmail {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for DiscountEmail {
    const PATH: &'static str = "discount-emails";
    const LABEL: &'static str = "discount emails";
    const COLUMNS: &'static [&'static str] = &["id", "email", "discount_code", "status"];
}
