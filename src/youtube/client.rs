use reqwest::Client;
use serde_json::json;

use super::{errors::YouTubeError, types::*};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// HTTPリクエストのタイムアウト（秒）
const HTTP_TIMEOUT_SECS: u64 = 10;

/// YouTube Data API v3 クライアント
///
/// 全呼び出しでOAuthアクセストークンをBearerヘッダーとして送る。
/// トークンの取得・更新は`auth`モジュールの責務で、ここでは扱わない。
pub struct YouTubeClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(access_token: String) -> Result<Self, YouTubeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            access_token,
            base_url: API_BASE.to_string(),
        })
    }

    /// ベースURLを差し替えたクライアントを作成（テスト用）
    #[cfg(test)]
    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
            base_url,
        }
    }

    /// アクセストークンを差し替える（トークン更新後に呼び出す）
    pub fn set_access_token(&mut self, access_token: String) {
        self.access_token = access_token;
    }

    /// チャンネルを検索して最初の結果のチャンネルIDを返す（クォータ100消費）
    pub async fn search_channel(&self, query: &str) -> Result<Option<String>, YouTubeError> {
        log::info!("Searching channel: {} (quota cost: 100 units)", query);

        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("part", "snippet"),
                ("type", "channel"),
                ("q", query),
                ("maxResults", "1"),
            ])
            .send()
            .await?;

        let response = Self::check_status(response, "search.list").await?;
        let data: SearchListResponse = response.json().await?;

        Ok(data
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet.channel_id))
    }

    /// チャンネルの最新動画を新しい順で取得（クォータ100消費）
    pub async fn search_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<VideoCandidate>, YouTubeError> {
        log::info!(
            "Fetching recent videos for channel: {} (quota cost: 100 units)",
            channel_id
        );

        let url = format!("{}/search", self.base_url);
        let max_results = max_results.to_string();

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("order", "date"),
                ("channelId", channel_id),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        let response = Self::check_status(response, "search.list").await?;
        let data: SearchListResponse = response.json().await?;

        // videoIdを持たないitem（チャンネル・プレイリスト等）は除外
        let videos: Vec<VideoCandidate> = data
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(VideoCandidate {
                    id: video_id,
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                })
            })
            .collect();

        log::info!("Fetched {} videos", videos.len());
        Ok(videos)
    }

    /// チャンネルIDからチャンネル情報を取得（クォータ1消費）
    pub async fn get_channel(
        &self,
        channel_id: &str,
    ) -> Result<Option<ChannelInfo>, YouTubeError> {
        log::info!("Looking up channel: {} (quota cost: 1 unit)", channel_id);

        let url = format!("{}/channels", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet"), ("id", channel_id)])
            .send()
            .await?;

        let response = Self::check_status(response, "channels.list").await?;
        let data: ChannelListResponse = response.json().await?;

        Ok(data.items.into_iter().next().map(|item| ChannelInfo {
            id: item.id,
            title: item.snippet.title,
        }))
    }

    /// 動画にトップレベルコメントを投稿する（クォータ50消費）
    pub async fn insert_comment(&self, video_id: &str, text: &str) -> Result<(), YouTubeError> {
        log::info!(
            "Inserting comment on video: {} (quota cost: 50 units)",
            video_id
        );

        let url = format!("{}/commentThreads", self.base_url);

        let body = json!({
            "snippet": {
                "videoId": video_id,
                "topLevelComment": {
                    "snippet": {
                        "textOriginal": text
                    }
                }
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await?;

        Self::check_status(response, "commentThreads.insert").await?;
        Ok(())
    }

    /// レスポンスのステータスを検査し、失敗を種別ごとのエラーに分類する
    async fn check_status(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<reqwest::Response, YouTubeError> {
        match response.status() {
            reqwest::StatusCode::OK => Ok(response),
            reqwest::StatusCode::UNAUTHORIZED => {
                log::error!("{}: unauthorized - OAuth token invalid", operation);
                Err(YouTubeError::Unauthorized)
            }
            reqwest::StatusCode::FORBIDDEN => {
                let error_text = response.text().await?;
                Err(Self::classify_forbidden(operation, &error_text))
            }
            reqwest::StatusCode::NOT_FOUND => {
                log::warn!("{}: resource not found", operation);
                Err(YouTubeError::VideoNotFound)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                log::error!(
                    "{}: unexpected API response - status: {}, body: {}",
                    operation,
                    status,
                    error_text
                );
                Err(YouTubeError::ParseError(format!(
                    "Unexpected status: {} - {}",
                    status, error_text
                )))
            }
        }
    }

    /// 403レスポンスの本文からエラー理由を分類する
    ///
    /// APIクライアント側に構造化されたエラー種別がないため、
    /// エラー本文の理由文字列で判別する
    fn classify_forbidden(operation: &str, error_text: &str) -> YouTubeError {
        if error_text.contains("quotaExceeded") {
            log::error!("{}: quota exceeded - daily limit reached", operation);
            YouTubeError::QuotaExceeded
        } else if error_text.contains("rateLimitExceeded") {
            log::warn!("{}: rate limit exceeded - will retry with backoff", operation);
            YouTubeError::RateLimitExceeded
        } else if error_text.contains("commentsDisabled") {
            log::warn!("{}: comments are disabled for this video", operation);
            YouTubeError::CommentsDisabled
        } else {
            log::error!(
                "{}: forbidden - insufficient permissions: {}",
                operation,
                error_text
            );
            YouTubeError::Unauthorized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn search_video_item(video_id: &str, published_at: &str) -> serde_json::Value {
        json!({
            "id": { "kind": "youtube#video", "videoId": video_id },
            "snippet": {
                "publishedAt": published_at,
                "channelId": "UCAAAAAAAAAAAAAAAAAAAAAA",
                "title": format!("video {}", video_id)
            }
        })
    }

    #[tokio::test]
    async fn test_search_videos_parses_items() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("type".into(), "video".into()))
            .with_status(200)
            .with_body(
                json!({
                    "items": [
                        search_video_item("vid1", "2024-05-01T10:00:00Z"),
                        search_video_item("vid2", "2024-05-01T08:00:00Z"),
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("token".to_string(), server.url());
        let videos = client
            .search_videos("UCAAAAAAAAAAAAAAAAAAAAAA", 10)
            .await
            .unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id, "vid1");
        assert_eq!(videos[0].published_at, "2024-05-01T10:00:00Z");
    }

    #[tokio::test]
    async fn test_search_channel_returns_first_result() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("type".into(), "channel".into()))
            .with_status(200)
            .with_body(
                json!({
                    "items": [{
                        "id": { "kind": "youtube#channel", "channelId": "UCBBBBBBBBBBBBBBBBBBBBBB" },
                        "snippet": {
                            "publishedAt": "2020-01-01T00:00:00Z",
                            "channelId": "UCBBBBBBBBBBBBBBBBBBBBBB",
                            "title": "Some Channel"
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("token".to_string(), server.url());
        let channel_id = client.search_channel("somechannel").await.unwrap();

        assert_eq!(channel_id, Some("UCBBBBBBBBBBBBBBBBBBBBBB".to_string()));
    }

    #[tokio::test]
    async fn test_search_channel_no_results() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "items": [] }).to_string())
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("token".to_string(), server.url());
        let channel_id = client.search_channel("nobody").await.unwrap();

        assert_eq!(channel_id, None);
    }

    #[tokio::test]
    async fn test_quota_exceeded_classified() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"errors":[{"reason":"quotaExceeded"}]}}"#)
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("token".to_string(), server.url());
        let err = client.search_videos("UCx", 10).await.unwrap_err();

        assert!(matches!(err, YouTubeError::QuotaExceeded));
        assert!(err.is_quota_exhausted());
    }

    #[tokio::test]
    async fn test_rate_limit_classified_as_retryable() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/commentThreads")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"errors":[{"reason":"rateLimitExceeded"}]}}"#)
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("token".to_string(), server.url());
        let err = client.insert_comment("vid1", "Great video!").await.unwrap_err();

        assert!(matches!(err, YouTubeError::RateLimitExceeded));
        assert!(!err.is_quota_exhausted());
    }

    #[tokio::test]
    async fn test_insert_comment_sends_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/commentThreads")
            .match_query(Matcher::UrlEncoded("part".into(), "snippet".into()))
            .match_body(Matcher::PartialJson(json!({
                "snippet": {
                    "videoId": "vid1",
                    "topLevelComment": { "snippet": { "textOriginal": "Great video!" } }
                }
            })))
            .with_status(200)
            .with_body(json!({ "id": "thread1" }).to_string())
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("token".to_string(), server.url());
        client.insert_comment("vid1", "Great video!").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_channel_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/channels")
            .match_query(Matcher::UrlEncoded(
                "id".into(),
                "UCAAAAAAAAAAAAAAAAAAAAAA".into(),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "items": [{
                        "id": "UCAAAAAAAAAAAAAAAAAAAAAA",
                        "snippet": { "title": "Some Channel" }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("token".to_string(), server.url());
        let info = client
            .get_channel("UCAAAAAAAAAAAAAAAAAAAAAA")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(info.id, "UCAAAAAAAAAAAAAAAAAAAAAA");
        assert_eq!(info.title, "Some Channel");
    }

    #[tokio::test]
    async fn test_unauthorized_classified() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"code":401}}"#)
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url("stale".to_string(), server.url());
        let err = client.search_videos("UCx", 10).await.unwrap_err();

        assert!(matches!(err, YouTubeError::Unauthorized));
    }
}
