use std::collections::HashMap;

use super::client::YouTubeClient;
use super::quota::{QuotaTracker, SEARCH_LIST_COST};

/// 正規チャンネルIDのプレフィックス
const CANONICAL_ID_PREFIX: &str = "UC";

/// 正規チャンネルIDの長さ
const CANONICAL_ID_LEN: usize = 24;

/// チャンネル識別子を正規のチャンネルIDに解決する
///
/// 識別子は3形式を受け付ける:
/// - 正規ID（`UC`で始まる24文字）: リモート呼び出しなしでそのまま返す
/// - ハンドル（`@username`）: `@`を除いた名前で検索
/// - カスタムURL形式（`c/ChannelName`）: `c/`を除いた名前で検索
///
/// 解決結果は1回の実行の間だけキャッシュされ、同じ識別子で
/// 2度クォータを消費することはない。失敗はキャッシュしない。
pub struct ChannelResolver {
    cache: HashMap<String, String>,
}

impl ChannelResolver {
    /// 空のキャッシュで新しいリゾルバーを作成
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// 識別子を正規チャンネルIDに解決する
    ///
    /// 解決できない場合はNoneを返す。呼び出し側はそのチャンネルを
    /// 今回の実行ではスキップし、他のチャンネルの処理を続行する。
    pub async fn resolve(
        &mut self,
        client: &YouTubeClient,
        quota: &mut QuotaTracker,
        identifier: &str,
    ) -> Option<String> {
        if is_canonical_id(identifier) {
            return Some(identifier.to_string());
        }

        if let Some(channel_id) = self.cache.get(identifier) {
            log::info!("Using cached channel ID: {} -> {}", identifier, channel_id);
            return Some(channel_id.clone());
        }

        if !quota.try_consume(SEARCH_LIST_COST) {
            return None;
        }

        match client.search_channel(search_query(identifier)).await {
            Ok(Some(channel_id)) => {
                log::info!("Resolved {} to channel ID: {}", identifier, channel_id);
                self.cache
                    .insert(identifier.to_string(), channel_id.clone());
                Some(channel_id)
            }
            Ok(None) => {
                log::error!("Could not resolve {} to a channel ID", identifier);
                None
            }
            Err(e) => {
                log::error!("Error resolving channel identifier {}: {}", identifier, e);
                if e.is_quota_exhausted() {
                    quota.mark_exhausted();
                }
                None
            }
        }
    }
}

impl Default for ChannelResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// 識別子が正規チャンネルIDの形をしているかどうか
pub(crate) fn is_canonical_id(identifier: &str) -> bool {
    identifier.starts_with(CANONICAL_ID_PREFIX) && identifier.len() == CANONICAL_ID_LEN
}

/// 識別子から検索クエリを組み立てる（`@`/`c/`プレフィックスを除去）
fn search_query(identifier: &str) -> &str {
    if let Some(handle) = identifier.strip_prefix('@') {
        handle
    } else if let Some(name) = identifier.strip_prefix("c/") {
        name
    } else {
        identifier
    }
}
