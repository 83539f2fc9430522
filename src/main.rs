// Welcome Bot
// Greets members joining a server and says goodbye to those leaving

mod commands;
mod features;
mod models;
mod utils;

use std::env;
use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::features::welcome::Welcome;
use crate::models::welcome::WelcomeConfig;
use crate::utils::config::BotConfig;
use crate::utils::i18n::Localizer;

/// User data shared across all commands and events
#[derive(Debug)]
pub struct Data {
    pub welcome: Arc<Welcome>,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all slash commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![commands::welcome::welcome()]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "welcome_bot=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::from_env().context("Failed to read bot configuration")?;

    info!("Starting Welcome Bot...");

    let l10n = Localizer::new(&config.lang).context("Failed to load locales")?;
    info!("Using language: {}", l10n.lang());

    // Missing or empty server configuration halts startup
    let servers = WelcomeConfig::from_file(&config.welcome_config)
        .context("Failed to load welcome configuration")?;
    let welcome = Welcome::new(servers, l10n, config.embed_color)
        .context("Invalid welcome configuration")?;
    info!(
        "Welcome configuration loaded for {} server(s)",
        welcome.config().len()
    );
    let welcome = Arc::new(welcome);

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(features::dispatcher::event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx.say(format!("❌ Error: {}", error)).await;
                        }
                        poise::FrameworkError::EventHandler { error, event, .. } => {
                            error!("Failed to handle {}: {:?}", event.snake_case_name(), error);
                        }
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Registering commands...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully!");

                Ok(Data { welcome })
            })
        })
        .build();

    // GUILD_MEMBERS is privileged, enable it in the Discord Dev Portal
    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .context("Failed to create client")?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to register Ctrl+C handler: {:?}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    info!("Goodbye!");
    Ok(())
}
