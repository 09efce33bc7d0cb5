mod common;

use anyhow::Result;
use chrono::Utc;
use serde_json::json;

use safetnet_admin::analytics::{bucket_counts, Bucket, DashboardSummary};
use safetnet_admin::export::Report;

#[tokio::test]
async fn export_from_live_collections() -> Result<()> {
    let backend = common::spawn_backend().await?;
    backend.set_alerts(vec![
        json!({
            "id": 1,
            "title": "Panic",
            "severity": "high",
            "status": "pending",
            "created_at": "2024-03-04T08:00:00Z"
        }),
        json!({
            "id": 2,
            "title": "Exit zone",
            "severity": "low",
            "status": "resolved",
            "created_at": "2024-03-12T08:00:00Z"
        }),
    ]);
    let api = backend.api(common::signed_in_store())?;

    let (users_api, alerts_api, incidents_api, geofences_api) =
        (api.users(), api.alerts(), api.incidents(), api.geofences());
    let (users, alerts, incidents, geofences) = futures::try_join!(
        users_api.list(),
        alerts_api.list(),
        incidents_api.list(),
        geofences_api.list(),
    )?;

    let summary = DashboardSummary::compute(&users, &alerts, &incidents, &geofences);
    assert_eq!(summary.total_users, 5);
    assert_eq!(summary.active_users, 3);
    assert_eq!(summary.open_alerts, 1);
    assert_eq!(summary.total_incidents, 0);
    assert_eq!(summary.users_by_role.get("SUPER_ADMIN"), Some(&1));

    let dir = tempfile::tempdir()?;
    let report = Report {
        generated_at: Utc::now(),
        summary: &summary,
        users: &users,
        alerts: &alerts,
        incidents: &incidents,
        geofences: &geofences,
    };
    let written = report.write_to_dir(dir.path())?;
    assert_eq!(written.len(), 7);

    let users_csv = std::fs::read_to_string(dir.path().join("users.csv"))?;
    assert_eq!(users_csv.lines().count(), 6);

    let text = std::fs::read_to_string(dir.path().join("report.txt"))?;
    assert!(text.contains("No incidents found"));

    let weekly = bucket_counts(&alerts, Bucket::Week, 0, Utc::now().date_naive());
    let counts: Vec<_> = weekly.iter().map(|b| (b.label.as_str(), b.count)).collect();
    assert_eq!(counts, vec![("2024-03-03", 1), ("2024-03-10", 1)]);
    Ok(())
}
