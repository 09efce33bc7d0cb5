mod credentials;
mod headers;
mod service;

pub use credentials::{CredentialStore, StorageKind, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
pub use headers::{auth_headers, json_headers};
pub use service::AuthService;
