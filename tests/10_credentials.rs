mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use safetnet_admin::auth::{
    auth_headers, CredentialStore, StorageKind, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY,
};
use safetnet_admin::error::StorageError;
use safetnet_admin::storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Memory storage that counts every call made against it
#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStorage {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStorage for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

fn counted() -> (CredentialStore, Arc<CountingStorage>, Arc<CountingStorage>) {
    let persistent = Arc::new(CountingStorage::default());
    let session = Arc::new(CountingStorage::default());
    let store = CredentialStore::new(Some(persistent.clone()), Some(session.clone()));
    (store, persistent, session)
}

#[test]
fn clear_removes_every_key_from_both_backends() -> Result<()> {
    let store = CredentialStore::in_memory();
    let user = common::admin_user();

    // Interleave both backends, including a stale persistent entry under a session login
    store.save("a1", "r1", &user, true);
    store.clear();
    store.save("a2", "r2", &user, false);
    store.save("a3", "r3", &user, true);
    store.save("a4", "r4", &user, false);
    store.clear();

    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
        assert_eq!(store.read(key), None, "{} survived clear", key);
    }
    assert!(!store.has_session());
    assert_eq!(store.origin(), None);
    Ok(())
}

#[test]
fn remembered_login_never_touches_session_backend() -> Result<()> {
    let (store, persistent, session) = counted();
    store.save("access", "refresh", &common::admin_user(), true);

    assert_eq!(store.access_token().as_deref(), Some("access"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh"));
    assert_eq!(store.user().map(|u| u.username), Some(common::USERNAME.to_string()));

    assert_eq!(persistent.writes(), 3);
    assert_eq!(session.writes(), 0);
    assert_eq!(session.reads(), 0);
    Ok(())
}

#[test]
fn session_login_never_writes_persistent_backend() -> Result<()> {
    let (store, persistent, session) = counted();
    store.save("access", "refresh", &common::admin_user(), false);

    assert_eq!(store.access_token().as_deref(), Some("access"));
    assert_eq!(store.origin(), Some(StorageKind::Session));

    assert_eq!(persistent.writes(), 0);
    assert_eq!(session.writes(), 3);
    Ok(())
}

#[test]
fn refreshed_token_goes_back_to_its_origin() -> Result<()> {
    let (store, persistent, session) = counted();
    store.save("access", "refresh", &common::admin_user(), false);

    assert_eq!(store.update_access_token("access-2", None), Some(StorageKind::Session));
    assert_eq!(store.access_token().as_deref(), Some("access-2"));
    assert_eq!(persistent.writes(), 0);
    assert_eq!(session.writes(), 4);
    Ok(())
}

#[test]
fn missing_backends_read_empty_and_swallow_writes() -> Result<()> {
    let store = CredentialStore::unavailable();
    store.save("access", "refresh", &common::admin_user(), true);
    store.save("access", "refresh", &common::admin_user(), false);

    assert_eq!(store.access_token(), None);
    assert_eq!(store.update_access_token("x", None), None);
    store.clear();

    let headers = auth_headers(&store, None);
    assert!(headers.get("authorization").is_none());
    assert_eq!(headers.get("content-type").map(|v| v.as_bytes()), Some(&b"application/json"[..]));
    Ok(())
}

#[test]
fn headers_pick_up_a_refresh_without_rebuilding_anything() -> Result<()> {
    let store = common::signed_in_store();
    let before = auth_headers(&store, None);
    assert_eq!(
        before.get("authorization").map(|v| v.as_bytes()),
        Some(&b"Bearer seeded-access"[..])
    );

    store.update_access_token("rotated", None);
    let after = auth_headers(&store, None);
    assert_eq!(after.get("authorization").map(|v| v.as_bytes()), Some(&b"Bearer rotated"[..]));

    let explicit = auth_headers(&store, Some("explicit"));
    assert_eq!(explicit.get("authorization").map(|v| v.as_bytes()), Some(&b"Bearer explicit"[..]));
    Ok(())
}

#[test]
fn file_backed_store_survives_a_new_process() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("credentials.json");

    let first = CredentialStore::new(Some(Arc::new(FileStorage::new(&path))), None);
    first.save("access", "refresh", &common::admin_user(), true);

    // A fresh store over the same file, as the next CLI invocation would build
    let second = CredentialStore::new(Some(Arc::new(FileStorage::new(&path))), None);
    assert_eq!(second.access_token().as_deref(), Some("access"));
    assert_eq!(second.user(), Some(common::admin_user()));

    second.clear();
    assert!(!path.exists());
    Ok(())
}
