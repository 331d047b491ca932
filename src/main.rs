mod config;
mod display;
mod models;
mod processing;
mod utils;

use std::{env, path::PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use serenity::all::Http;
use tokio::{signal::ctrl_c, sync::watch, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::models::Stats;
use crate::processing::{
    CollectOptions, PairingRules, build_archive_pairs, collect_guild, list_all_guilds,
};
use crate::utils::file::{list_archive_files, save_pairs};
use crate::utils::selection::{GuildSource, guild_source, prompt_guild_id};

#[derive(Parser)]
#[command(name = "chat_pairs")]
#[command(about = "Turn a Discord chat archive into prompt/response fine-tuning pairs", version)]
struct Cli {
    /// TOML config file; defaults apply when it does not exist
    #[arg(short, long, default_value = "chat_pairs.toml")]
    config: PathBuf,

    /// Your Discord user ID, whose messages become the responses
    #[arg(long, env = "USER_ID", global = true)]
    user_id: Option<u64>,

    /// Directory holding one archive file per channel
    #[arg(long, global = true)]
    raw_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download channel history into the raw archive directory
    Dump {
        /// Guild to collect (repeatable); prompts when none is configured
        #[arg(long = "guild", value_name = "ID")]
        guilds: Vec<u64>,

        /// Collect every guild the account belongs to
        #[arg(long)]
        all_guilds: bool,
    },

    /// Build prompt/response pairs from the raw archive
    Pairs {
        /// Output JSONL file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_pairs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from: {}", cli.config.display());
    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(user_id) = cli.user_id {
        config.target_user_id = user_id;
    }
    if let Some(raw_dir) = cli.raw_dir {
        config.archive.raw_dir = raw_dir;
    }

    match cli.command {
        Commands::Dump { guilds, all_guilds } => {
            if !guilds.is_empty() {
                config.collect.guilds = guilds;
            }
            if all_guilds {
                config.collect.all_guilds = true;
            }
            config.validate()?;
            run_dump(&config).await
        }
        Commands::Pairs { out } => {
            if let Some(out) = out {
                config.archive.out_file = out;
            }
            config.validate()?;
            run_pairs(&config)
        }
    }
}

fn run_pairs(config: &Config) -> Result<()> {
    let rules = PairingRules::from_config(config.target_user_id, &config.pairing)?;
    let files = list_archive_files(&config.archive.raw_dir)?;
    if files.is_empty() {
        bail!("No archive files found in {}", config.archive.raw_dir.display());
    }
    info!("🚀 Building pairs from {} channel archives", files.len());

    let mut stats = Stats::new(config.archive.out_file.display().to_string());
    let mut pairs = Vec::new();
    for channel in build_archive_pairs(&files, &rules)? {
        pairs.extend(channel.pairs);
        stats.add_channel_stats(channel.stats);
    }

    save_pairs(&pairs, &config.archive.out_file)?;
    info!(
        "Built {} prompt-response pairs -> {}",
        pairs.len(),
        config.archive.out_file.display()
    );
    display::print_pair_stats(&stats);
    Ok(())
}

async fn run_dump(config: &Config) -> Result<()> {
    let token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN not found in environment")?;
    let http = Http::new(&token);

    let guild_ids = match guild_source(config.collect.all_guilds, &config.collect.guilds)? {
        GuildSource::All => list_all_guilds(&http).await?,
        GuildSource::Listed(ids) => ids,
        GuildSource::Prompt => vec![prompt_guild_id()?],
    };

    let options = CollectOptions {
        raw_dir: config.archive.raw_dir.clone(),
        target_user_id: config.target_user_id,
        skip_channels: config.collect.skip_channels.clone(),
        max_retries: config.collect.max_retries,
        page_delay: Duration::from_millis(config.collect.page_delay_ms),
        concurrent_channels: config.collect.concurrent_channels,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Ok(()) = ctrl_c().await {
            warn!("⚠️ Received Ctrl+C, gracefully shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut results = Vec::new();
    for guild_id in guild_ids {
        if *shutdown_rx.borrow() {
            break;
        }
        match http.get_guild(guild_id).await {
            Ok(guild) => info!("=== {} ===", guild.name),
            Err(e) => {
                warn!("❌ Failed to access server {}: {}", guild_id, e);
                continue;
            }
        }
        results.extend(collect_guild(&http, guild_id, &options, shutdown_rx.clone()).await?);
    }

    display::print_collect_stats(&results, *shutdown_rx.borrow());
    Ok(())
}
