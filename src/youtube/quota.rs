/// search.list 1回あたりのクォータコスト（units）
pub const SEARCH_LIST_COST: u64 = 100;

/// commentThreads.insert 1回あたりのクォータコスト（units）
pub const COMMENT_INSERT_COST: u64 = 50;

/// channels.list 1回あたりのクォータコスト（units）
pub const CHANNELS_LIST_COST: u64 = 1;

/// 1回の実行で消費してよいクォータの上限（units）
///
/// YouTube Data APIの1日あたりの割り当て（10,000 units）を少し下回る値に
/// しておき、他の用途の分を残す
pub const DEFAULT_QUOTA_CEILING: u64 = 9_500;

/// 1回の実行内のクォータ消費を管理する構造体
///
/// カウンターは実行開始時に0から始まり、リモート呼び出しの前に
/// `try_consume`で消費を申請する。上限を超える申請は拒否され、
/// 一度拒否される（またはAPIからクォータ枯渇エラーを受け取る）と
/// ラッチが立ち、その実行中のすべての申請がコスト値に関係なく拒否される。
///
/// メモリ上のみの実行スコープ状態であり、プロセスをまたいだ調整は行わない。
#[derive(Debug)]
pub struct QuotaTracker {
    used: u64,
    ceiling: u64,
    exhausted: bool,
}

impl QuotaTracker {
    /// 新しいトラッカーを作成（カウンターは0から開始）
    pub fn new(ceiling: u64) -> Self {
        Self {
            used: 0,
            ceiling,
            exhausted: false,
        }
    }

    /// 指定コストの消費を申請する
    ///
    /// 上限内であればカウンターに加算してtrueを返す。
    /// 上限を超える場合はラッチを立ててfalseを返す。
    pub fn try_consume(&mut self, cost: u64) -> bool {
        if self.exhausted {
            return false;
        }

        if self.used + cost > self.ceiling {
            log::warn!("Quota limit reached: {}/{}", self.used, self.ceiling);
            self.mark_exhausted();
            return false;
        }

        self.used += cost;
        log::info!("Quota used: {}/{}", self.used, self.ceiling);
        true
    }

    /// クォータ枯渇としてラッチする
    ///
    /// APIから明示的なクォータ枯渇エラーを受け取った場合に呼び出す。
    /// 以降の`try_consume`は条件を再判定せずに拒否される。
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
        self.used = self.ceiling;
    }

    /// クォータが枯渇しているかどうか
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// 消費済みクォータ量を取得
    pub fn used(&self) -> u64 {
        self.used
    }

    /// クォータ上限を取得
    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }
}
