use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;

use crate::analytics::{bucket_counts, Bucket, BucketCount, Timestamped};
use crate::cli::commands::resource::fetch_list;
use crate::cli::{CliContext, OutputFormat};
use crate::client::Resource;
use crate::models::{Alert, Incident, UserRecord, ADMIN_ROLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    Week,
    Month,
}

impl From<Period> for Bucket {
    fn from(period: Period) -> Self {
        match period {
            Period::Week => Bucket::Week,
            Period::Month => Bucket::Month,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SeriesArgs {
    #[arg(long, value_enum, default_value = "week", help = "Bucket size")]
    pub by: Period,
    #[arg(long, default_value_t = 8, help = "Trailing buckets to show (0 for all)")]
    pub buckets: usize,
}

#[derive(Subcommand)]
pub enum AnalyticsCommands {
    #[command(about = "Alerts created per week or month")]
    Alerts(SeriesArgs),

    #[command(about = "Incidents reported per week or month")]
    Incidents(SeriesArgs),

    #[command(about = "Users joined per week or month")]
    Users(SeriesArgs),
}

pub async fn handle(cmd: AnalyticsCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.enter("/dashboard", ADMIN_ROLES)?;
    match cmd {
        AnalyticsCommands::Alerts(args) => series::<Alert>(ctx, args).await,
        AnalyticsCommands::Incidents(args) => series::<Incident>(ctx, args).await,
        AnalyticsCommands::Users(args) => series::<UserRecord>(ctx, args).await,
    }
}

async fn series<T: Resource + Timestamped + Clone>(
    ctx: &CliContext,
    args: SeriesArgs,
) -> anyhow::Result<()> {
    let items = fetch_list::<T>(ctx).await?;
    let bucket = Bucket::from(args.by);
    let counts = bucket_counts(&items, bucket, args.buckets, Utc::now().date_naive());

    match ctx.format {
        OutputFormat::Json => {
            let body = json!({
                "resource": T::PATH,
                "bucket": bucket,
                "series": counts,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => print!("{}", render_bars(&counts)),
    }
    Ok(())
}

/// One line per bucket with a bar scaled to the largest count
fn render_bars(counts: &[BucketCount]) -> String {
    const WIDTH: usize = 40;
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let label_width = counts.iter().map(|c| c.label.len()).max().unwrap_or(0);

    let mut out = String::new();
    for c in counts {
        let bar = if max == 0 { 0 } else { (c.count * WIDTH).div_ceil(max) };
        out.push_str(&format!(
            "{:<lw$}  {:>5}  {}\n",
            c.label,
            c.count,
            "#".repeat(bar),
            lw = label_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bars_scale_to_largest_bucket() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let counts = vec![
            BucketCount {
                label: "2024-03-03".into(),
                start,
                count: 4,
            },
            BucketCount {
                label: "2024-03-10".into(),
                start,
                count: 0,
            },
            BucketCount {
                label: "2024-03-17".into(),
                start,
                count: 1,
            },
        ];

        let text = render_bars(&counts);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(&"#".repeat(40)));
        assert!(lines[1].trim_end().ends_with('0'));
        assert!(lines[2].ends_with(&"#".repeat(10)));
    }
}
