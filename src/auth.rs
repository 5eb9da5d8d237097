// =============================================================================
// OAuthトークン管理モジュール
// =============================================================================
// token.jsonの読み書きと、リフレッシュトークンによるアクセストークン更新
//
// 認可フロー自体（ブラウザでの同意画面）はこのモジュールでは扱わない。
// token.jsonは認可フローを一度実行して作成しておく必要がある。
// =============================================================================

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Google OAuth 2.0 トークンエンドポイント
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// HTTPリクエストのタイムアウト（秒）
const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token file not found: {0} - run the authorization flow to create it")]
    TokenNotFound(String),

    #[error("failed to read token file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse token file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("token refresh request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    #[error("no refresh token available - re-run the authorization flow")]
    NoRefreshToken,
}

/// token.jsonに保存されるOAuthトークン一式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// アクセストークン（Bearerヘッダーで送る値）
    pub token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// 有効期限（RFC 3339）
    pub expiry: Option<String>,
}

/// トークン更新レスポンス
#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
    expires_in: i64,
}

impl StoredToken {
    /// トークンファイルを読み込む
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::TokenNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    /// トークンファイルへ保存する
    pub fn save(&self, path: &Path) -> Result<(), AuthError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 有効期限をパースして返す
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        self.expiry
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// 指定日数以内に有効期限が切れるかどうか
    ///
    /// 有効期限が不明（未設定・パース不能）の場合は更新が必要とみなす
    pub fn expires_within(&self, days: i64, now: DateTime<Utc>) -> bool {
        match self.expiry_time() {
            Some(expiry) => expiry <= now + Duration::days(days),
            None => true,
        }
    }

    /// リフレッシュトークンでアクセストークンを更新する
    ///
    /// 成功すると`token`と`expiry`が新しい値に置き換わる
    pub async fn refresh(&mut self) -> Result<(), AuthError> {
        let refresh_token = self
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;

        let endpoint = self.token_uri.as_deref().unwrap_or(TOKEN_ENDPOINT);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let response = client
            .post(endpoint)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshRejected(format!(
                "status {}: {}",
                status, body
            )));
        }

        let refreshed: TokenRefreshResponse = response.json().await?;

        self.token = refreshed.access_token;
        self.expiry = Some((Utc::now() + Duration::seconds(refreshed.expires_in)).to_rfc3339());

        Ok(())
    }
}

/// 有効期限が近ければトークンを更新してファイルに保存する
///
/// 更新後（または更新不要だった場合）の最新トークンを返す。
/// 更新の失敗はエラーとして返し、呼び出し側が実行を中止できるようにする。
pub async fn refresh_token_if_needed(
    path: &Path,
    days_threshold: i64,
) -> Result<StoredToken, AuthError> {
    let mut token = StoredToken::load(path)?;

    if !token.expires_within(days_threshold, Utc::now()) {
        log::info!(
            "Token still valid until {:?}. No refresh needed.",
            token.expiry
        );
        return Ok(token);
    }

    log::info!(
        "Token expiring soon ({:?}). Attempting to refresh...",
        token.expiry
    );

    token.refresh().await?;
    token.save(path)?;

    log::info!(
        "Token refreshed successfully. New expiry: {:?}",
        token.expiry
    );

    Ok(token)
}
