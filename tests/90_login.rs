mod common;

use anyhow::Result;

use safetnet_admin::auth::{CredentialStore, StorageKind};
use safetnet_admin::cli::{CliContext, OutputFormat, Reported};
use safetnet_admin::models::ADMIN_ROLES;
use safetnet_admin::query::{
    DataQuery, FetchOutcome, NotificationLevel, Notifier, Phase, ViewRender,
};

#[tokio::test]
async fn session_login_then_empty_alerts_is_an_empty_state() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = CredentialStore::in_memory();
    let ctx = CliContext::build(backend.config(), store.clone(), OutputFormat::Json)?;

    let user = ctx
        .api
        .auth()
        .login(common::USERNAME, common::PASSWORD, false)
        .await?;
    ctx.session.login(user);
    assert_eq!(store.origin(), Some(StorageKind::Session));

    ctx.enter("/alerts", ADMIN_ROLES)?;

    let client = ctx.api.alerts();
    let query = DataQuery::new(
        move || {
            let client = client.clone();
            async move { client.list().await }
        },
        ctx.notifications.clone(),
    );

    assert_eq!(query.mount().await, FetchOutcome::Applied);
    assert_eq!(query.phase(), Phase::Success);
    assert_eq!(query.error(), None);
    assert_eq!(query.view(), ViewRender::Empty);
    assert!(ctx.notifications.active().is_empty());

    // The login token went out with the list request
    assert_eq!(
        backend.bearer_tokens().last().cloned().flatten().as_deref(),
        Some("access-1")
    );
    Ok(())
}

#[tokio::test]
async fn bad_credentials_surface_the_backend_detail() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = CredentialStore::in_memory();
    let ctx = CliContext::build(backend.config(), store.clone(), OutputFormat::Json)?;

    let err = ctx
        .api
        .auth()
        .login(common::USERNAME, "wrong", true)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    let reported = ctx.fail(err);
    assert_eq!(reported.to_string(), "Invalid credentials");

    let shown = ctx.notifications.active();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].level, NotificationLevel::Error);
    assert_eq!(shown[0].text, "Invalid credentials");

    // Nothing was stored and the guard still refuses protected routes
    assert!(!store.has_session());
    let refused = ctx.enter("/dashboard", ADMIN_ROLES).unwrap_err();
    assert!(refused.downcast_ref::<Reported>().is_some());
    Ok(())
}

#[tokio::test]
async fn whoami_refreshes_the_cached_user() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::signed_in_store();
    let ctx = CliContext::build(backend.config(), store.clone(), OutputFormat::Json)?;

    ctx.enter("/profile", &[])?;
    let user = ctx.api.auth().profile().await?;
    assert_eq!(user.username, common::USERNAME);
    assert_eq!(store.user(), Some(user));

    // Notifications pushed by any layer land in the same center
    ctx.notifications.notify(NotificationLevel::Info, "Profile loaded");
    ctx.flush_notifications()?;
    assert!(ctx.notifications.active().is_empty());

    Ok(())
}
