//! Diagnostic binary: loads a channel's chat assets and prints them as JSON.
//!
//! Reads `CHAT_ASSETS_*` overrides from the environment (and `.env`).

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use chat_assets::{ChatAssets, ChatAssetsConfig, CullTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Asset {
    Emotes,
    Badges,
    Cheermotes,
    All,
}

#[derive(Debug, Parser)]
#[command(name = "chat-assets-probe", about = "Fetch chat assets for a Twitch channel")]
struct Args {
    /// Channel login name.
    login: String,

    /// Twitch user id, skipping the login lookup.
    #[arg(long, env = "CHAT_ASSETS_CHANNEL_ID")]
    id: Option<String>,

    #[arg(long, value_enum, default_value = "all")]
    asset: Asset,

    /// Load twice and report whether the second load was served from cache.
    #[arg(long)]
    twice: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = ChatAssetsConfig::from_env();
    let assets = ChatAssets::connect(&config)?;
    let culler = CullTimer::start(assets.cache().clone(), config.cull_interval);

    let rounds = if args.twice { 2 } else { 1 };
    for round in 1..=rounds {
        let started = std::time::Instant::now();
        let output = load(&assets, &args).await?;
        tracing::info!(
            round,
            elapsed_ms = started.elapsed().as_millis() as u64,
            cached_entries = assets.cache().len(),
            "Loaded chat assets"
        );
        if round == rounds {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    culler.stop().await;
    Ok(())
}

async fn load(assets: &ChatAssets, args: &Args) -> anyhow::Result<serde_json::Value> {
    let login = args.login.as_str();
    let id = args.id.as_deref();
    let mut output = serde_json::Map::new();

    if matches!(args.asset, Asset::Emotes | Asset::All) {
        let emotes = assets.load_emotes(login, id).await?;
        output.insert("emotes".into(), serde_json::to_value(&*emotes)?);
    }
    if matches!(args.asset, Asset::Badges | Asset::All) {
        let badges = assets.load_badges(login, id).await?;
        output.insert("badges".into(), serde_json::to_value(&*badges)?);
    }
    if matches!(args.asset, Asset::Cheermotes | Asset::All) {
        let cheermotes = assets.load_cheermotes(login, id).await?;
        output.insert("cheermotes".into(), (*cheermotes).clone());
    }

    Ok(serde_json::Value::Object(output))
}
