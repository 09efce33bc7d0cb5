pub mod commands;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

pub use context::{CliContext, Reported};

#[derive(Parser)]
#[command(name = "safetnet")]
#[command(about = "SafeTNet admin CLI - users, alerts, geofences, incidents and reports")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "List every record of a resource")]
    List {
        #[arg(value_enum, help = "Resource type")]
        resource: ResourceKind,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(value_enum, help = "Resource type")]
        resource: ResourceKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from JSON on stdin")]
    Create {
        #[arg(value_enum, help = "Resource type")]
        resource: ResourceKind,
    },

    #[command(about = "Partially update a record from JSON on stdin")]
    Update {
        #[arg(value_enum, help = "Resource type")]
        resource: ResourceKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(value_enum, help = "Resource type")]
        resource: ResourceKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Weekly or monthly counts for charts")]
    Analytics {
        #[command(subcommand)]
        cmd: commands::analytics::AnalyticsCommands,
    },

    #[command(about = "Export summary, breakdowns and raw tables to a directory")]
    Export {
        #[arg(long, help = "Output directory")]
        out: std::path::PathBuf,
    },
}

/// Resource types reachable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Users,
    Alerts,
    Geofences,
    Incidents,
    Organizations,
    Notifications,
    Officers,
    Promocodes,
    Reports,
    #[value(name = "sub-admins")]
    SubAdmins,
    #[value(name = "user-details")]
    UserDetails,
    #[value(name = "user-replies")]
    UserReplies,
    #[value(name = "discount-emails")]
    DiscountEmails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = CliContext::new(output_format)?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::List { resource } => commands::resource::list(resource, &ctx).await,
        Commands::Get { resource, id } => commands::resource::get(resource, &id, &ctx).await,
        Commands::Create { resource } => commands::resource::create(resource, &ctx).await,
        Commands::Update { resource, id } => commands::resource::update(resource, &id, &ctx).await,
        Commands::Delete { resource, id } => commands::resource::delete(resource, &id, &ctx).await,
        Commands::Analytics { cmd } => commands::analytics::handle(cmd, &ctx).await,
        Commands::Export { out } => commands::export::handle(&out, &ctx).await,
    };

    ctx.flush_notifications()?;
    result
}
