//! Report export from already-fetched data.
//!
//! Produces a set of CSV sheets (summary, breakdowns, one raw table per
//! resource) and a printable multi-section text report. Nothing here touches
//! the network.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::analytics::DashboardSummary;
use crate::client::Resource;
use crate::models::{Alert, Geofence, Incident, UserRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush sheet '{0}'")]
    Flush(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One named CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub struct Report<'a> {
    pub generated_at: DateTime<Utc>,
    pub summary: &'a DashboardSummary,
    pub users: &'a [UserRecord],
    pub alerts: &'a [Alert],
    pub incidents: &'a [Incident],
    pub geofences: &'a [Geofence],
}

impl<'a> Report<'a> {
    fn metrics(&self) -> Vec<(&'static str, usize)> {
        let s = self.summary;
        vec![
            ("Total users", s.total_users),
            ("Active users", s.active_users),
            ("Total alerts", s.total_alerts),
            ("Open alerts", s.open_alerts),
            ("Total incidents", s.total_incidents),
            ("Open incidents", s.open_incidents),
            ("Total geofences", s.total_geofences),
            ("Active geofences", s.active_geofences),
        ]
    }

    fn breakdowns(&self) -> Vec<(&'static str, &std::collections::BTreeMap<String, usize>)> {
        let s = self.summary;
        vec![
            ("Alerts by status", &s.alerts_by_status),
            ("Alerts by severity", &s.alerts_by_severity),
            ("Incidents by status", &s.incidents_by_status),
            ("Users by role", &s.users_by_role),
        ]
    }

    pub fn to_sheets(&self) -> Result<Vec<Sheet>, ExportError> {
        let mut sheets = Vec::new();

        let mut summary = csv::Writer::from_writer(Vec::new());
        summary.write_record(["metric", "value"])?;
        summary.write_record(["Generated at", self.generated_at.to_rfc3339().as_str()])?;
        for (metric, value) in self.metrics() {
            summary.write_record([metric, value.to_string().as_str()])?;
        }
        sheets.push(finish("summary", summary)?);

        let mut breakdowns = csv::Writer::from_writer(Vec::new());
        breakdowns.write_record(["breakdown", "key", "count"])?;
        for (name, counts) in self.breakdowns() {
            for (key, count) in counts {
                breakdowns.write_record([name, key.as_str(), count.to_string().as_str()])?;
            }
        }
        sheets.push(finish("breakdowns", breakdowns)?);

        sheets.push(table_sheet(self.users)?);
        sheets.push(table_sheet(self.alerts)?);
        sheets.push(table_sheet(self.incidents)?);
        sheets.push(table_sheet(self.geofences)?);

        Ok(sheets)
    }

    /// Printable report: summary metrics, breakdowns, then detail tables
    pub fn to_text(&self) -> Result<String, ExportError> {
        let mut out = String::new();
        let _ = writeln!(out, "SafeTNet Admin Report");
        let _ = writeln!(out, "Generated at {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"));
        let _ = writeln!(out);

        let _ = writeln!(out, "== Summary ==");
        for (metric, value) in self.metrics() {
            let _ = writeln!(out, "{:<20} {:>8}", metric, value);
        }

        for (name, counts) in self.breakdowns() {
            let _ = writeln!(out);
            let _ = writeln!(out, "== {} ==", name);
            if counts.is_empty() {
                let _ = writeln!(out, "(none)");
            }
            for (key, count) in counts {
                let _ = writeln!(out, "{:<20} {:>8}", key, count);
            }
        }

        text_table(&mut out, self.alerts)?;
        text_table(&mut out, self.incidents)?;
        Ok(out)
    }

    /// Write every sheet plus `report.txt` into `dir`
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        for sheet in self.to_sheets()? {
            let path = dir.join(format!("{}.csv", sheet.name));
            fs::write(&path, &sheet.bytes)?;
            written.push(path);
        }

        let path = dir.join("report.txt");
        fs::write(&path, self.to_text()?)?;
        written.push(path);

        Ok(written)
    }
}

fn finish(name: &str, writer: csv::Writer<Vec<u8>>) -> Result<Sheet, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|_| ExportError::Flush(name.to_string()))?;
    Ok(Sheet {
        name: name.to_string(),
        bytes,
    })
}

/// Render a scalar JSON field for a cell
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn rows<T: Serialize>(items: &[T]) -> Result<Vec<Value>, ExportError> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(ExportError::from))
        .collect()
}

fn table_sheet<T: Resource>(items: &[T]) -> Result<Sheet, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::COLUMNS)?;
    for row in rows(items)? {
        writer.write_record(T::COLUMNS.iter().map(|column| cell(row.get(*column))))?;
    }
    finish(&T::LABEL.replace(' ', "_"), writer)
}

fn text_table<T: Resource>(out: &mut String, items: &[T]) -> Result<(), ExportError> {
    let _ = writeln!(out);
    let _ = writeln!(out, "== {} ({}) ==", title_case(T::LABEL), items.len());
    if items.is_empty() {
        let _ = writeln!(out, "No {} found", T::LABEL);
        return Ok(());
    }
    let _ = writeln!(out, "{}", T::COLUMNS.join(" | "));
    for row in rows(items)? {
        let cells: Vec<String> = T::COLUMNS.iter().map(|c| cell(row.get(*c))).collect();
        let _ = writeln!(out, "{}", cells.join(" | "));
    }
    Ok(())
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
