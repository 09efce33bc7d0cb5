use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::warn;

use super::CredentialStore;

/// JSON headers without credentials
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// JSON headers plus `Authorization: Bearer <token>` when a token is known.
///
/// `explicit_token` takes priority; otherwise the store is read on every call
/// so a token refreshed mid-session is used by the very next request.
pub fn auth_headers(store: &CredentialStore, explicit_token: Option<&str>) -> HeaderMap {
    let mut headers = json_headers();

    let token = match explicit_token.filter(|t| !t.is_empty()) {
        Some(token) => Some(token.to_string()),
        None => store.access_token(),
    };

    if let Some(token) = token {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!(
                "stored access token contains invalid header characters, sending without it"
            ),
        }
    }

    headers
}
