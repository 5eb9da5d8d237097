use chrono::Utc;
use tokio::time::sleep;

use crate::config::{self, BotConfig};

use super::backoff::ExponentialBackoff;
use super::client::YouTubeClient;
use super::eligibility::filter_eligible;
use super::pool::CommentPool;
use super::quota::{QuotaTracker, CHANNELS_LIST_COST, COMMENT_INSERT_COST, SEARCH_LIST_COST};
use super::resolver::ChannelResolver;
use super::store::PostedVideos;
use super::types::VideoCandidate;

/// 自動コメントボット本体
///
/// 設定されたチャンネルを順に処理し、適格な動画にコメントを投稿する。
/// コメント済み記録とコメントプールはプロセス開始時に読み込んで保持する。
/// クォータトラッカーと解決キャッシュは実行ごとに新規作成し、
/// 実行をまたいで持ち越さない。
pub struct CommentBot {
    config: BotConfig,
    client: YouTubeClient,
    posted: PostedVideos,
    comments: CommentPool,
}

impl CommentBot {
    /// コメント済み記録とコメントプールを読み込んでボットを作成する
    pub fn new(config: BotConfig, client: YouTubeClient) -> std::io::Result<Self> {
        let posted = PostedVideos::load(&config.posted_videos_file)?;
        let comments = CommentPool::load(&config.comments_file)?;

        Ok(Self {
            config,
            client,
            posted,
            comments,
        })
    }

    /// アクセストークンを差し替える（トークン更新後に呼び出す）
    pub fn set_access_token(&mut self, access_token: String) {
        self.client.set_access_token(access_token);
    }

    /// ボットを1回実行する
    ///
    /// 全チャンネルの処理が終わるか、クォータが枯渇すると終了する。
    /// チャンネル単位の失敗はログに残して次のチャンネルへ進む。
    pub async fn run(&mut self) {
        let mut quota = QuotaTracker::new(self.config.quota_ceiling);
        let mut resolver = ChannelResolver::new();

        let channels = config::load_channel_ids(&self.config.channel_ids_file);
        if channels.is_empty() {
            log::warn!("No channel identifiers configured");
        }

        for identifier in &channels {
            if quota.is_exhausted() {
                log::error!(
                    "Stopping - quota limit reached: {}/{}",
                    quota.used(),
                    quota.ceiling()
                );
                break;
            }

            log::info!("Processing channel: {}", identifier);
            self.process_channel(identifier, &mut quota, &mut resolver)
                .await;
        }

        log::info!(
            "Run completed. Total quota used: {}/{}",
            quota.used(),
            quota.ceiling()
        );
    }

    /// 1チャンネル分の処理: 解決→動画取得→適格判定→コメント投稿
    async fn process_channel(
        &mut self,
        identifier: &str,
        quota: &mut QuotaTracker,
        resolver: &mut ChannelResolver,
    ) {
        let Some(channel_id) = resolver.resolve(&self.client, quota, identifier).await else {
            log::error!(
                "Skipping channel {} - could not resolve channel ID",
                identifier
            );
            return;
        };

        let videos = self.list_recent_videos(&channel_id, quota).await;
        if videos.is_empty() {
            return;
        }

        let eligible = filter_eligible(
            videos,
            self.posted.ids(),
            Utc::now(),
            self.config.comment_delay,
            self.config.max_comments_per_channel,
        );

        for video in eligible {
            if quota.is_exhausted() {
                log::error!(
                    "Quota limit reached during commenting: {}/{}",
                    quota.used(),
                    quota.ceiling()
                );
                return;
            }

            log::info!("Posting comment on video {}: {}", video.id, video.title);
            self.post_comment(&video.id, quota).await;

            // 投稿の成否にかかわらず次の投稿まで間隔を空ける
            log::info!(
                "Waiting {} seconds before next comment...",
                self.config.comment_interval.as_secs()
            );
            sleep(self.config.comment_interval).await;
        }
    }

    /// チャンネルの最新動画を取得する
    ///
    /// リモートエラーは空のリストとして扱い、この層から外へは伝播させない。
    /// クォータ枯渇エラーだけはトラッカーをラッチして以降の呼び出しを打ち切る。
    async fn list_recent_videos(
        &self,
        channel_id: &str,
        quota: &mut QuotaTracker,
    ) -> Vec<VideoCandidate> {
        if !quota.try_consume(SEARCH_LIST_COST) {
            return Vec::new();
        }

        match self
            .client
            .search_videos(channel_id, self.config.search_page_size)
            .await
        {
            Ok(videos) => videos,
            Err(e) => {
                log::error!("Error fetching videos for channel {}: {}", channel_id, e);
                if e.is_quota_exhausted() {
                    quota.mark_exhausted();
                }
                Vec::new()
            }
        }
    }

    /// 動画にコメントを投稿する
    ///
    /// 失敗時は指数バックオフで最大`max_retries`回まで試行する。
    /// クォータ枯渇エラーはリトライせず即座に打ち切る。
    /// 成功が確認できた場合のみ、戻る前に永続記録へ動画IDを追記する。
    async fn post_comment(&mut self, video_id: &str, quota: &mut QuotaTracker) -> bool {
        let comment_text = match self.comments.pick() {
            Some(text) => text.to_string(),
            None => {
                log::error!("No comments available to post");
                return false;
            }
        };

        if !quota.try_consume(COMMENT_INSERT_COST) {
            return false;
        }

        let mut backoff = ExponentialBackoff::new(self.config.initial_retry_delay);
        let mut retry_count = 0;

        while retry_count < self.config.max_retries {
            match self.client.insert_comment(video_id, &comment_text).await {
                Ok(()) => {
                    log::info!("Successfully commented on video {}", video_id);
                    if let Err(e) = self.posted.record(video_id) {
                        // 記録に失敗すると次回の実行で二重投稿し得るため大きく残す
                        log::error!(
                            "CRITICAL: failed to persist posted video {}: {}",
                            video_id,
                            e
                        );
                    }
                    return true;
                }
                Err(e) => {
                    retry_count += 1;
                    log::error!(
                        "Error posting comment to {} (attempt {}): {}",
                        video_id,
                        retry_count,
                        e
                    );

                    if e.is_quota_exhausted() {
                        quota.mark_exhausted();
                        return false;
                    }

                    if retry_count < self.config.max_retries {
                        let delay = backoff.next_delay();
                        log::warn!("Retrying in {} seconds", delay.as_secs());
                        sleep(delay).await;
                    }
                }
            }
        }

        log::error!(
            "Failed to post comment on video {} after {} attempts",
            video_id,
            self.config.max_retries
        );
        false
    }

    /// チャンネルリストの全識別子が解決できるか検証する
    ///
    /// 正規IDはchannels.listで実在確認し、それ以外は検索で解決する。
    /// `fix`が指定された場合、解決できた正規IDだけを集めた
    /// `fixed_`付きファイルを書き出す。
    /// 戻り値は(解決成功数, 失敗数)。
    pub async fn validate_channels(&self, fix: bool) -> std::io::Result<(usize, usize)> {
        let mut quota = QuotaTracker::new(self.config.quota_ceiling);
        let mut resolver = ChannelResolver::new();

        let channels = config::load_channel_ids(&self.config.channel_ids_file);
        if channels.is_empty() {
            log::error!("No channel identifiers found to validate");
            return Ok((0, 0));
        }

        log::info!("Found {} channel identifiers to validate", channels.len());

        println!(
            "{:<30} {:<24} {:<40}",
            "Channel Identifier", "Channel ID", "Channel Title"
        );
        println!("{}", "-".repeat(96));

        let mut fixed_channels = Vec::new();
        let mut ok = 0;
        let mut failed = 0;

        for identifier in &channels {
            match self.validate_channel(identifier, &mut quota, &mut resolver).await {
                Some(info) => {
                    println!("{:<30} {:<24} {:<40}", identifier, info.id, info.title);
                    fixed_channels.push(info.id);
                    ok += 1;
                }
                None => {
                    println!("{:<30} {:<24} {:<40}", identifier, "NOT FOUND", "N/A");
                    failed += 1;
                }
            }
        }

        log::info!("Validation complete: {} resolved, {} failed", ok, failed);

        if fix && !fixed_channels.is_empty() {
            let fixed_file = self.config.channel_ids_file.with_file_name(format!(
                "fixed_{}",
                self.config
                    .channel_ids_file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "channel_ids.txt".to_string())
            ));
            std::fs::write(&fixed_file, fixed_channels.join("\n") + "\n")?;
            log::info!("Created fixed channel IDs file: {}", fixed_file.display());
        }

        Ok((ok, failed))
    }

    /// 1識別子分の検証
    async fn validate_channel(
        &self,
        identifier: &str,
        quota: &mut QuotaTracker,
        resolver: &mut ChannelResolver,
    ) -> Option<super::types::ChannelInfo> {
        // 正規IDは実在確認のみ（検索より大幅に安い）
        if super::resolver::is_canonical_id(identifier) {
            if !quota.try_consume(CHANNELS_LIST_COST) {
                return None;
            }
            return match self.client.get_channel(identifier).await {
                Ok(info) => info,
                Err(e) => {
                    log::error!("API error for {}: {}", identifier, e);
                    if e.is_quota_exhausted() {
                        quota.mark_exhausted();
                    }
                    None
                }
            };
        }

        let channel_id = resolver.resolve(&self.client, quota, identifier).await?;

        if !quota.try_consume(CHANNELS_LIST_COST) {
            return None;
        }
        match self.client.get_channel(&channel_id).await {
            Ok(info) => info,
            Err(e) => {
                log::error!("API error for {}: {}", identifier, e);
                if e.is_quota_exhausted() {
                    quota.mark_exhausted();
                }
                None
            }
        }
    }
}
