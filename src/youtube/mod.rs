// =============================================================================
// YouTube Data API 連携モジュール
// =============================================================================
// チャンネル識別子の解決・最新動画の取得・コメント投稿を行う
//
// 機能:
// - チャンネル識別子（正規ID / @ハンドル / カスタムURL形式）の解決
// - 公開から一定時間経過した未コメント動画の選定
// - クォータ残量を見ながらのコメント自動投稿（指数バックオフ付き）
//
// 使用API: YouTube Data API v3（search.list / channels.list / commentThreads.insert）
// https://developers.google.com/youtube/v3/docs
// =============================================================================

mod backoff;
mod bot;
mod client;
mod eligibility;
mod errors;
mod pool;
mod quota;
mod resolver;
mod store;
mod types;

pub use backoff::ExponentialBackoff;
pub use bot::CommentBot;
pub use client::YouTubeClient;
pub use eligibility::filter_eligible;
pub use errors::YouTubeError;
pub use pool::CommentPool;
pub use quota::{QuotaTracker, DEFAULT_QUOTA_CEILING};
pub use resolver::ChannelResolver;
pub use store::PostedVideos;
pub use types::VideoCandidate;
