//! Client-side aggregation of fetched collections for charts and reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Alert, Geofence, Incident, Notification, UserRecord};

/// Records that carry a creation time
pub trait Timestamped {
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

impl Timestamped for Alert {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Timestamped for Incident {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Timestamped for UserRecord {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date_joined
    }
}

impl Timestamped for Notification {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Count items per key
pub fn group_by<I, K, F>(items: I, mut key_fn: F) -> BTreeMap<K, usize>
where
    I: IntoIterator,
    K: Ord,
    F: FnMut(&I::Item) -> K,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key_fn(&item)).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Week,
    Month,
}

/// Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// `YYYY-MM`
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// First day of the bucket containing `date`
pub fn bucket_start(date: NaiveDate, bucket: Bucket) -> NaiveDate {
    match bucket {
        Bucket::Week => week_start(date),
        Bucket::Month => date.with_day(1).unwrap_or(date),
    }
}

fn previous_bucket(start: NaiveDate, bucket: Bucket) -> NaiveDate {
    match bucket {
        Bucket::Week => start - Duration::days(7),
        Bucket::Month => {
            let (year, month) = if start.month() == 1 {
                (start.year() - 1, 12)
            } else {
                (start.year(), start.month() - 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(start)
        }
    }
}

pub fn bucket_label(start: NaiveDate, bucket: Bucket) -> String {
    match bucket {
        Bucket::Week => start.format("%Y-%m-%d").to_string(),
        Bucket::Month => month_key(start),
    }
}

/// One point of a chart series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub label: String,
    pub start: NaiveDate,
    pub count: usize,
}

/// Counts per week or month, oldest first.
///
/// With `trailing > 0` the series is exactly the `trailing` buckets ending at
/// the one containing `today`, zero-filled; items outside that window are not
/// counted. With `trailing == 0` every bucket that has items is returned.
/// Items without a timestamp are skipped.
pub fn bucket_counts<T: Timestamped>(
    items: &[T],
    bucket: Bucket,
    trailing: usize,
    today: NaiveDate,
) -> Vec<BucketCount> {
    let counts = group_by(
        items.iter().filter_map(|item| item.timestamp()),
        |ts| bucket_start(ts.date_naive(), bucket),
    );

    let starts: Vec<NaiveDate> = if trailing == 0 {
        counts.keys().copied().collect()
    } else {
        let mut starts = Vec::with_capacity(trailing);
        let mut current = bucket_start(today, bucket);
        for _ in 0..trailing {
            starts.push(current);
            current = previous_bucket(current, bucket);
        }
        starts.reverse();
        starts
    };

    starts
        .into_iter()
        .map(|start| BucketCount {
            label: bucket_label(start, bucket),
            start,
            count: counts.get(&start).copied().unwrap_or(0),
        })
        .collect()
}

fn status_key(status: Option<&str>) -> String {
    status
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn is_closed(status: Option<&str>) -> bool {
    matches!(status_key(status).as_str(), "resolved" | "closed" | "dismissed")
}

/// Headline numbers and breakdowns shown on the dashboard and in exports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_users: usize,
    pub active_users: usize,
    pub total_alerts: usize,
    pub open_alerts: usize,
    pub total_incidents: usize,
    pub open_incidents: usize,
    pub total_geofences: usize,
    pub active_geofences: usize,
    pub alerts_by_status: BTreeMap<String, usize>,
    pub alerts_by_severity: BTreeMap<String, usize>,
    pub incidents_by_status: BTreeMap<String, usize>,
    pub users_by_role: BTreeMap<String, usize>,
}

impl DashboardSummary {
    pub fn compute(
        users: &[UserRecord],
        alerts: &[Alert],
        incidents: &[Incident],
        geofences: &[Geofence],
    ) -> Self {
        Self {
            total_users: users.len(),
            active_users: users.iter().filter(|u| u.is_active).count(),
            total_alerts: alerts.len(),
            open_alerts: alerts.iter().filter(|a| !is_closed(a.status.as_deref())).count(),
            total_incidents: incidents.len(),
            open_incidents: incidents
                .iter()
                .filter(|i| !is_closed(i.status.as_deref()))
                .count(),
            total_geofences: geofences.len(),
            active_geofences: geofences.iter().filter(|g| g.active).count(),
            alerts_by_status: group_by(alerts, |a| status_key(a.status.as_deref())),
            alerts_by_severity: group_by(alerts, |a| status_key(a.severity.as_deref())),
            incidents_by_status: group_by(incidents, |i| status_key(i.status.as_deref())),
            users_by_role: group_by(users, |u| u.role.as_str().to_string()),
        }
    }
}
