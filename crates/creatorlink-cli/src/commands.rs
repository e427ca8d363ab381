//! Command handlers. Results go to stdout as pretty JSON, logs to stderr.

use std::sync::Arc;

use creatorlink_client::{
    CreatorApi, CreatorClient, CredentialStore, FileCredentialStore, LogNavigator, RequestGateway,
    StaticIdentityProvider, TokenResolver,
};
use creatorlink_core::{AppConfig, CoverageEdit, PlatformType, PriceEdit, ProfileEdit};
use creatorlink_sync::{ProfileSync, SyncError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{Commands, CoverageCommands, PlatformCommands, PriceCommands, ProfileCommands};

fn token_resolver(config: &AppConfig) -> TokenResolver {
    let store: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    TokenResolver::new(store).with_identity_provider(Arc::new(StaticIdentityProvider::new(
        config.federated_token.clone(),
    )))
}

fn profile_sync(config: &AppConfig, blogger_id: String) -> anyhow::Result<ProfileSync> {
    let gateway = RequestGateway::from_config(config, token_resolver(config), Arc::new(LogNavigator))?;
    let api: Arc<dyn CreatorApi> = Arc::new(CreatorClient::new(Arc::new(gateway)));
    Ok(ProfileSync::from_config(api, blogger_id, config))
}

async fn loaded(config: &AppConfig, blogger_id: String) -> anyhow::Result<ProfileSync> {
    let sync = profile_sync(config, blogger_id)?;
    sync.load().await.map_err(cli_error)?;
    Ok(sync)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Converts a sync failure into the message shown to the user.
pub(crate) fn cli_error(err: SyncError) -> anyhow::Error {
    if let Some(fields) = err.field_errors().filter(|f| !f.is_empty()) {
        let details: Vec<String> = fields
            .iter()
            .map(|f| format!("  {}: {}", f.field, f.message))
            .collect();
        return anyhow::anyhow!("{}\n{}", err, details.join("\n"));
    }
    match err.user_message() {
        Some(message) => anyhow::anyhow!(message),
        None if matches!(err, SyncError::Cancelled) => anyhow::anyhow!("cancelled"),
        None => anyhow::anyhow!("not signed in or session expired; run `creatorlink login`"),
    }
}

pub(crate) async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Login { token, kind } => {
            token_resolver(config).sign_in(kind.into(), &token)?;
            tracing::info!(path = %config.credentials_path.display(), "credential stored");
        }
        Commands::Logout { elevated_only } => {
            let tokens = token_resolver(config);
            if elevated_only {
                tokens.clear_elevated()?;
            } else {
                tokens.clear_all()?;
            }
        }
        Commands::Whoami => {
            let active = token_resolver(config).resolve().await;
            print_json(&serde_json::json!({
                "signedIn": active.is_some(),
                "kind": active.map(|c| c.kind),
                "env": config.env.to_string(),
                "apiBaseUrl": config.api_base_url,
            }))?;
        }
        Commands::Profile { command } => run_profile(command, config).await?,
        Commands::Platform { command } => run_platform(command, config).await?,
        Commands::Prices {
            command:
                PriceCommands::Set {
                    blogger_id,
                    platform,
                    post,
                    story,
                    integration,
                },
        } => {
            let edit = PriceEdit {
                post_price: post,
                story_price: story,
                integration_price: integration,
            };
            let sync = loaded(config, blogger_id).await?;
            let view = sync.update_prices(platform, &edit).await.map_err(cli_error)?;
            print_json(&view.platform(platform))?;
        }
        Commands::Coverage {
            command:
                CoverageCommands::Set {
                    blogger_id,
                    platform,
                    post_reach,
                    story_reach,
                },
        } => {
            let edit = CoverageEdit {
                post_reach,
                story_reach,
            };
            let sync = loaded(config, blogger_id).await?;
            let view = sync
                .update_coverage(platform, &edit)
                .await
                .map_err(cli_error)?;
            print_json(&view.platform(platform))?;
        }
    }
    Ok(())
}

async fn run_profile(command: ProfileCommands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        ProfileCommands::Show { blogger_id } => {
            let sync = loaded(config, blogger_id).await?;
            print_json(&serde_json::json!({
                "awaitingModeration": sync.awaiting_moderation(),
                "profile": sync.view(),
            }))
        }
        ProfileCommands::Edit {
            blogger_id,
            name,
            contact_link,
            work_format,
            gender,
            barter,
            registry,
        } => {
            let edit = ProfileEdit {
                name,
                contact_link,
                work_format,
                gender,
                is_barter_available: barter,
                is_in_registry: registry,
            };
            if edit.is_empty() {
                anyhow::bail!("nothing to change; pass at least one field");
            }
            let sync = loaded(config, blogger_id).await?;
            let view = sync.update_profile(&edit).await.map_err(cli_error)?;
            print_json(&view)
        }
    }
}

async fn run_platform(command: PlatformCommands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        PlatformCommands::Add {
            blogger_id,
            platform,
            url,
        } => {
            let sync = loaded(config, blogger_id).await?;
            sync.add_platform(platform, &url).await.map_err(cli_error)?;
            print_json(&sync.view().and_then(|v| v.platform(platform).cloned()))
        }
        PlatformCommands::Update {
            blogger_id,
            platform,
            url,
        } => {
            let sync = loaded(config, blogger_id).await?;
            let link = relink_until_interrupted(&sync, platform, &url).await?;
            print_json(&link)
        }
    }
}

/// Re-links and waits for ingestion; Ctrl-C stops waiting and keeps the old
/// account.
async fn relink_until_interrupted(
    sync: &ProfileSync,
    platform: PlatformType,
    url: &str,
) -> anyhow::Result<creatorlink_core::PlatformLink> {
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });
    eprintln!("waiting for {platform} data; press Ctrl-C to stop");

    let result = sync
        .update_platform_with_cancel(platform, url, &cancel)
        .await;
    interrupt.abort();
    result.map_err(cli_error)
}
