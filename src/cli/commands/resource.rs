use std::io::Read;

use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::utils::{
    output_collection, output_empty_collection, output_record, output_skeleton, output_success,
};
use crate::cli::{CliContext, Reported, ResourceKind};
use crate::client::Resource;
use crate::models::{
    Alert, DiscountEmail, Geofence, Incident, Notification, Officer, Organization, Promocode,
    Report, SubAdmin, UserDetail, UserRecord, UserReply,
};
use crate::query::{DataQuery, ViewRender};

/// Run a generic command for the model behind a `ResourceKind`
macro_rules! dispatch {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            ResourceKind::Users => $func::<UserRecord>($($arg),*).await,
            ResourceKind::Alerts => $func::<Alert>($($arg),*).await,
            ResourceKind::Geofences => $func::<Geofence>($($arg),*).await,
            ResourceKind::Incidents => $func::<Incident>($($arg),*).await,
            ResourceKind::Organizations => $func::<Organization>($($arg),*).await,
            ResourceKind::Notifications => $func::<Notification>($($arg),*).await,
            ResourceKind::Officers => $func::<Officer>($($arg),*).await,
            ResourceKind::Promocodes => $func::<Promocode>($($arg),*).await,
            ResourceKind::Reports => $func::<Report>($($arg),*).await,
            ResourceKind::SubAdmins => $func::<SubAdmin>($($arg),*).await,
            ResourceKind::UserDetails => $func::<UserDetail>($($arg),*).await,
            ResourceKind::UserReplies => $func::<UserReply>($($arg),*).await,
            ResourceKind::DiscountEmails => $func::<DiscountEmail>($($arg),*).await,
        }
    };
}

pub async fn list(kind: ResourceKind, ctx: &CliContext) -> anyhow::Result<()> {
    dispatch!(kind, list_view(ctx))
}

pub async fn get(kind: ResourceKind, id: &str, ctx: &CliContext) -> anyhow::Result<()> {
    dispatch!(kind, detail_view(ctx, id))
}

pub async fn create(kind: ResourceKind, ctx: &CliContext) -> anyhow::Result<()> {
    let payload = read_payload()?;
    dispatch!(kind, create_record(ctx, &payload))
}

pub async fn update(kind: ResourceKind, id: &str, ctx: &CliContext) -> anyhow::Result<()> {
    let payload = read_payload()?;
    dispatch!(kind, update_record(ctx, id, &payload))
}

pub async fn delete(kind: ResourceKind, id: &str, ctx: &CliContext) -> anyhow::Result<()> {
    dispatch!(kind, delete_record(ctx, id))
}

fn route<T: Resource>() -> String {
    format!("/{}", T::PATH)
}

/// JSON document from stdin
fn read_payload() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read JSON from stdin")?;
    serde_json::from_str(&input).context("Invalid JSON on stdin")
}

/// Mounts a one-shot list view and renders whatever state it settles in
pub(crate) async fn fetch_list<T: Resource + Clone>(ctx: &CliContext) -> anyhow::Result<Vec<T>> {
    let client = ctx.api.resource::<T>();
    let query = DataQuery::new(
        move || {
            let client = client.clone();
            async move { client.list().await }
        },
        ctx.notifications.clone(),
    );

    output_skeleton(&ctx.format, T::LABEL);
    query.mount().await;

    let render = query.view();
    query.unmount();
    match render {
        ViewRender::Content(items) => Ok(items),
        ViewRender::Empty | ViewRender::Skeleton => Ok(Vec::new()),
        ViewRender::Error(text) => Err(Reported(text).into()),
    }
}

async fn list_view<T: Resource + Clone>(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.enter(&route::<T>(), T::ROLES)?;
    let items = fetch_list::<T>(ctx).await?;

    if items.is_empty() {
        return output_empty_collection(&ctx.format, T::PATH, &format!("No {} found", T::LABEL));
    }

    let rows = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    output_collection(&ctx.format, T::PATH, T::COLUMNS, &rows)
}

async fn detail_view<T: Resource>(ctx: &CliContext, id: &str) -> anyhow::Result<()> {
    ctx.enter(&format!("{}/{}", route::<T>(), id), T::ROLES)?;
    let record = ctx.api.resource::<T>().get(id).await.map_err(|e| ctx.fail(e))?;
    output_record(&ctx.format, &serde_json::to_value(&record)?)
}

async fn create_record<T: Resource>(ctx: &CliContext, payload: &Value) -> anyhow::Result<()> {
    ctx.enter(&route::<T>(), T::ROLES)?;
    let record = ctx.api.resource::<T>().create(payload).await.map_err(|e| ctx.fail(e))?;
    let record = serde_json::to_value(&record)?;

    let id = record.get("id").cloned().unwrap_or(Value::Null);
    output_success(
        &ctx.format,
        &format!("Created {} {}", T::LABEL, id),
        Some(json!({ "record": record })),
    )
}

async fn update_record<T: Resource>(
    ctx: &CliContext,
    id: &str,
    payload: &Value,
) -> anyhow::Result<()> {
    ctx.enter(&format!("{}/{}", route::<T>(), id), T::ROLES)?;
    let record = ctx
        .api
        .resource::<T>()
        .update(id, payload)
        .await
        .map_err(|e| ctx.fail(e))?;

    output_success(
        &ctx.format,
        &format!("Updated {} {}", T::LABEL, id),
        Some(json!({ "record": serde_json::to_value(&record)? })),
    )
}

async fn delete_record<T: Resource>(ctx: &CliContext, id: &str) -> anyhow::Result<()> {
    ctx.enter(&route::<T>(), T::ROLES)?;
    ctx.api.resource::<T>().delete(id).await.map_err(|e| ctx.fail(e))?;
    output_success(
        &ctx.format,
        &format!("Deleted {} {}", T::LABEL, id),
        Some(json!({ "id": id })),
    )
}
