use std::path::Path;

use rand::seq::SliceRandom;

/// コメントファイルがない場合に書き出すデフォルトのコメント候補
const DEFAULT_COMMENTS: [&str; 3] = [
    "Great video!",
    "Very informative content!",
    "Thanks for sharing!",
];

/// 投稿するコメント候補のプール
///
/// 1行1件のテキストファイルから実行開始時に読み込む。
/// 投稿のたびに一様ランダムで1件選ぶ（重複選択あり）。
pub struct CommentPool {
    comments: Vec<String>,
}

impl CommentPool {
    /// コメントファイルを読み込む
    ///
    /// ファイルが存在しない場合はデフォルトのプールを書き出してから使う。
    /// 不正なUTF-8は損失許容で読む。
    pub fn load(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            log::info!(
                "Comments file {} not found, writing default pool",
                path.display()
            );
            std::fs::write(path, DEFAULT_COMMENTS.join("\n"))?;
        }

        let bytes = std::fs::read(path)?;
        let comments: Vec<String> = String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        log::info!("Loaded {} comments from {}", comments.len(), path.display());

        Ok(Self { comments })
    }

    /// プールからコメントを一様ランダムに1件選ぶ
    ///
    /// プールが空の場合はNoneを返す
    pub fn pick(&self) -> Option<&str> {
        self.comments
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }
}
