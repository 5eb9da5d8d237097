// =============================================================================
// 共通設定・定数モジュール
// =============================================================================
// ボット全体で使用する設定値・ファイルパスを定義
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

/// コメント投稿までの待機時間（3時間）
///
/// 公開直後の動画にはコメントせず、公開から3時間経過した動画のみを対象にする
pub const COMMENT_DELAY_SECS: u64 = 3 * 60 * 60;

/// コメント投稿失敗時の最大リトライ回数
pub const MAX_RETRIES: u32 = 5;

/// リトライの初期待機時間（秒）
///
/// 失敗するたびに2倍に増加する
pub const INITIAL_RETRY_DELAY_SECS: u64 = 60;

/// 連続コメント間の待機時間（秒）
pub const COMMENT_INTERVAL_SECS: u64 = 10;

/// search.listの1回あたりの取得件数
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// 1チャンネル1回の実行あたりの最大コメント数
pub const MAX_COMMENTS_PER_CHANNEL: usize = 3;

/// チャンネルIDリストの環境変数名（カンマ区切り、ファイルより優先）
const CHANNEL_IDS_ENV: &str = "CHANNEL_IDS";

/// ボットの実行設定
///
/// 全コンポーネントに構築時に渡す。プロセス全体のグローバル状態は持たない。
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// チャンネルIDリストファイル
    pub channel_ids_file: PathBuf,
    /// コメント済み動画IDの記録ファイル
    pub posted_videos_file: PathBuf,
    /// コメント候補ファイル
    pub comments_file: PathBuf,
    /// OAuthトークンファイル
    pub token_file: PathBuf,
    /// コメント投稿までの待機時間
    pub comment_delay: Duration,
    /// コメント投稿失敗時の最大リトライ回数
    pub max_retries: u32,
    /// リトライの初期待機時間
    pub initial_retry_delay: Duration,
    /// 連続コメント間の待機時間
    pub comment_interval: Duration,
    /// 1回の実行あたりのクォータ上限
    pub quota_ceiling: u64,
    /// search.listの取得件数
    pub search_page_size: u32,
    /// 1チャンネルあたりの最大コメント数
    pub max_comments_per_channel: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            channel_ids_file: PathBuf::from("channel_ids.txt"),
            posted_videos_file: PathBuf::from("posted_videos.txt"),
            comments_file: PathBuf::from("comments.txt"),
            token_file: PathBuf::from("token.json"),
            comment_delay: Duration::from_secs(COMMENT_DELAY_SECS),
            max_retries: MAX_RETRIES,
            initial_retry_delay: Duration::from_secs(INITIAL_RETRY_DELAY_SECS),
            comment_interval: Duration::from_secs(COMMENT_INTERVAL_SECS),
            quota_ceiling: crate::youtube::DEFAULT_QUOTA_CEILING,
            search_page_size: SEARCH_PAGE_SIZE,
            max_comments_per_channel: MAX_COMMENTS_PER_CHANNEL,
        }
    }
}

/// チャンネルIDリストを読み込む
///
/// 環境変数 `CHANNEL_IDS`（カンマ区切り）が設定されていればそちらを優先し、
/// なければファイルから1行1件で読み込む。空行と`#`で始まる行は無視する。
/// ファイルが存在しない場合は空リストを返す（エラーにはしない）。
pub fn load_channel_ids(path: &Path) -> Vec<String> {
    if let Ok(raw) = std::env::var(CHANNEL_IDS_ENV) {
        return parse_channel_lines(raw.split(','));
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => parse_channel_lines(contents.lines()),
        Err(e) => {
            log::warn!("Could not read channel list {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// 行の集合からチャンネルIDを抽出する（空行・コメント行を除外）
fn parse_channel_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
