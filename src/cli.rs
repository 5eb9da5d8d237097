use clap::{Parser, Subcommand};

/// YouTube Auto-Comment Bot
#[derive(Parser, Debug)]
#[command(name = "yt-comment-bot", version, about)]
pub struct Cli {
    /// チェック間隔（秒）
    #[arg(long, default_value_t = 3600)]
    pub interval: u64,

    /// 一度だけ実行して終了する
    #[arg(long)]
    pub run_once: bool,

    /// 起動時のトークン更新チェックをスキップする
    #[arg(long)]
    pub skip_token_refresh: bool,

    /// チャンネルIDリストファイル
    #[arg(long, default_value = "channel_ids.txt")]
    pub channel_ids_file: String,

    /// コメント済み動画の記録ファイル
    #[arg(long, default_value = "posted_videos.txt")]
    pub posted_videos_file: String,

    /// コメント候補ファイル
    #[arg(long, default_value = "comments.txt")]
    pub comments_file: String,

    /// OAuthトークンファイル
    #[arg(long, default_value = "token.json")]
    pub token_file: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// チャンネルリストの識別子がすべて解決できるか検証する
    ValidateChannels {
        /// 解決済みの正規IDだけを集めたファイルを書き出す
        #[arg(long)]
        fix: bool,
    },
}
