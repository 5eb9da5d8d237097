use thiserror::Error;

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("OAuth token is invalid or expired")]
    Unauthorized,

    #[error("Quota exceeded - daily limit reached")]
    QuotaExceeded,

    #[error("Rate limit exceeded - retrying with backoff")]
    RateLimitExceeded,

    #[error("Comments are disabled for this video")]
    CommentsDisabled,

    #[error("Video not found")]
    VideoNotFound,

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl YouTubeError {
    /// クォータ枯渇を示すエラーかどうか
    ///
    /// これがtrueの場合、呼び出し側はQuotaTrackerをラッチして
    /// 以降のリモート呼び出しを打ち切る必要がある
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExceeded)
    }
}
