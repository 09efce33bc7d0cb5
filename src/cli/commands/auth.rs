use clap::Subcommand;
use serde_json::json;
use tracing::debug;

use crate::cli::utils::{output_record, output_success};
use crate::cli::{CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Keep the session after this shell exits")]
        remember: bool,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Refresh authentication token")]
    Refresh,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login {
            username,
            password,
            remember,
        } => login(ctx, &username, password, remember).await,
        AuthCommands::Logout => logout(ctx).await,
        AuthCommands::Status => status(ctx),
        AuthCommands::Refresh => refresh(ctx).await,
        AuthCommands::Whoami => whoami(ctx).await,
    }
}

async fn login(
    ctx: &CliContext,
    username: &str,
    password: Option<String>,
    remember: bool,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };

    let user = ctx
        .api
        .auth()
        .login(username, &password, remember)
        .await
        .map_err(|e| ctx.fail(e))?;

    ctx.session.login(user.clone());
    let storage = ctx.api.store().origin().map(|kind| kind.as_str());
    debug!(?storage, "credentials stored");

    output_success(
        &ctx.format,
        &format!("Logged in as {} ({})", user.username, user.role.as_str()),
        Some(json!({ "user": user, "storage": storage })),
    )
}

async fn logout(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.session.mount(&ctx.config.session.login_route);
    ctx.session.logout().await;
    output_success(&ctx.format, "Logged out", None)
}

fn status(ctx: &CliContext) -> anyhow::Result<()> {
    let store = ctx.api.store();
    let user = store.user();
    let storage = store.origin().map(|kind| kind.as_str());
    let authenticated = store.has_session();

    match ctx.format {
        OutputFormat::Json => {
            let status = json!({
                "authenticated": authenticated,
                "user": user,
                "storage": storage,
                "server": ctx.config.api.base_url,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Text => match (authenticated, user) {
            (true, Some(user)) => {
                println!("Logged in as {} ({})", user.username, user.role.as_str());
                println!("Server:  {}", ctx.config.api.base_url);
                println!("Storage: {}", storage.unwrap_or("unknown"));
            }
            _ => println!("Not logged in"),
        },
    }
    Ok(())
}

async fn refresh(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.api.auth().refresh().await.map_err(|e| ctx.fail(e))?;
    output_success(&ctx.format, "Token refreshed", None)
}

async fn whoami(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.enter("/profile", &[])?;
    let user = ctx.api.auth().profile().await.map_err(|e| ctx.fail(e))?;
    output_record(&ctx.format, &serde_json::to_value(&user)?)
}
