//! Records as consumed by the admin client; the backend owns them.

mod alert;
mod catalog;
mod geofence;
mod incident;
mod organization;
mod user;

pub use alert::Alert;
pub use catalog::{
    DiscountEmail, Notification, Officer, Promocode, Report, SubAdmin, UserDetail, UserReply,
};
pub use geofence::Geofence;
pub use incident::Incident;
pub use organization::Organization;
pub use user::{UserRecord, UserRole, ADMIN_ROLES, SUPER_ADMIN_ONLY};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Backend fields the typed models do not name; kept so updates lose nothing
pub type Extra = Map<String, Value>;

/// A JSON `null` reads like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
