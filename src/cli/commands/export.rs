use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::analytics::DashboardSummary;
use crate::cli::commands::resource::fetch_list;
use crate::cli::utils::output_success;
use crate::cli::CliContext;
use crate::export::Report;
use crate::models::{Alert, Geofence, Incident, UserRecord, ADMIN_ROLES};

pub async fn handle(out: &Path, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.enter("/reports", ADMIN_ROLES)?;

    let (users, alerts, incidents, geofences) = futures::try_join!(
        fetch_list::<UserRecord>(ctx),
        fetch_list::<Alert>(ctx),
        fetch_list::<Incident>(ctx),
        fetch_list::<Geofence>(ctx),
    )?;

    let summary = DashboardSummary::compute(&users, &alerts, &incidents, &geofences);
    let report = Report {
        generated_at: Utc::now(),
        summary: &summary,
        users: &users,
        alerts: &alerts,
        incidents: &incidents,
        geofences: &geofences,
    };

    let written = report.write_to_dir(out)?;
    info!(dir = %out.display(), files = written.len(), "report exported");

    let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
    output_success(
        &ctx.format,
        &format!("Exported {} files to {}", written.len(), out.display()),
        Some(json!({ "files": files, "summary": summary })),
    )
}
