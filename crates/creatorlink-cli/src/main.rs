mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use creatorlink_client::CredentialKind;
use creatorlink_core::PlatformType;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "creatorlink")]
#[command(about = "Manage a creator profile and its linked social platforms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store a credential for subsequent requests
    Login {
        #[arg(long)]
        token: String,

        #[arg(long, value_enum, default_value_t = LoginKind::Access)]
        kind: LoginKind,
    },
    /// Remove stored credentials
    Logout {
        /// Only drop admin credentials and stay signed in as the user
        #[arg(long)]
        elevated_only: bool,
    },
    /// Show which credential requests would use
    Whoami,
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    Platform {
        #[command(subcommand)]
        command: PlatformCommands,
    },
    Prices {
        #[command(subcommand)]
        command: PriceCommands,
    },
    Coverage {
        #[command(subcommand)]
        command: CoverageCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LoginKind {
    Access,
    Admin,
    AdminTemp,
}

impl From<LoginKind> for CredentialKind {
    fn from(kind: LoginKind) -> Self {
        match kind {
            LoginKind::Access => CredentialKind::Access,
            LoginKind::Admin => CredentialKind::Admin,
            LoginKind::AdminTemp => CredentialKind::AdminTemp,
        }
    }
}

#[derive(Debug, Subcommand)]
enum ProfileCommands {
    /// Print the merged profile (published data with pending drafts applied)
    Show { blogger_id: String },
    /// Submit profile field changes for moderation
    Edit {
        blogger_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        contact_link: Option<String>,

        #[arg(long)]
        work_format: Option<String>,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        barter: Option<bool>,

        #[arg(long)]
        registry: Option<bool>,
    },
}

#[derive(Debug, Subcommand)]
enum PlatformCommands {
    /// Link a platform that is not linked yet
    Add {
        blogger_id: String,
        platform: PlatformType,
        url: String,
    },
    /// Re-link a platform to another account and wait for its data
    Update {
        blogger_id: String,
        platform: PlatformType,
        url: String,
    },
}

#[derive(Debug, Subcommand)]
enum PriceCommands {
    Set {
        blogger_id: String,
        platform: PlatformType,

        #[arg(long)]
        post: Option<u64>,

        #[arg(long)]
        story: Option<u64>,

        #[arg(long)]
        integration: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
enum CoverageCommands {
    Set {
        blogger_id: String,
        platform: PlatformType,

        #[arg(long)]
        post_reach: Option<u64>,

        #[arg(long)]
        story_reach: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = creatorlink_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    commands::run(cli.command, &config).await
}
