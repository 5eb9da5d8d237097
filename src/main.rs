use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::time::sleep;

use yt_comment_bot::auth;
use yt_comment_bot::cli::{Cli, Commands};
use yt_comment_bot::config::BotConfig;
use yt_comment_bot::youtube::{CommentBot, YouTubeClient};

/// トークン更新を行う残り日数のしきい値
const TOKEN_REFRESH_THRESHOLD_DAYS: i64 = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("Starting YouTube Auto-Comment Bot");

    let config = BotConfig {
        channel_ids_file: PathBuf::from(&cli.channel_ids_file),
        posted_videos_file: PathBuf::from(&cli.posted_videos_file),
        comments_file: PathBuf::from(&cli.comments_file),
        token_file: PathBuf::from(&cli.token_file),
        ..BotConfig::default()
    };

    let token = obtain_token(&config, cli.skip_token_refresh)
        .await
        .context("Failed to prepare OAuth token. Run the authorization flow to create a new token.")?;

    let client =
        YouTubeClient::new(token.token.clone()).context("Failed to build YouTube client")?;

    let mut bot = CommentBot::new(config.clone(), client).context("Failed to initialize bot")?;

    if let Some(Commands::ValidateChannels { fix }) = cli.command {
        log::info!("Validating YouTube channels...");
        let (ok, failed) = bot.validate_channels(fix).await?;
        log::info!("{} resolved, {} failed", ok, failed);
        return Ok(());
    }

    if cli.run_once {
        log::info!("Running bot once");
        bot.run().await;
        return Ok(());
    }

    log::info!(
        "Bot will check for new videos every {} seconds",
        cli.interval
    );

    loop {
        bot.run().await;

        log::info!("Sleeping for {} seconds", cli.interval);
        sleep(Duration::from_secs(cli.interval)).await;

        // 長時間動かすとアクセストークンが失効するため、実行のたびに確認する
        let token = obtain_token(&config, cli.skip_token_refresh)
            .await
            .context("Failed to refresh OAuth token between runs")?;
        bot.set_access_token(token.token);
    }
}

/// トークンを読み込み、必要であれば更新して返す
async fn obtain_token(
    config: &BotConfig,
    skip_refresh: bool,
) -> Result<auth::StoredToken, auth::AuthError> {
    if skip_refresh {
        return auth::StoredToken::load(&config.token_file);
    }

    log::info!("Checking token expiration status...");
    auth::refresh_token_if_needed(&config.token_file, TOKEN_REFRESH_THRESHOLD_DAYS).await
}
