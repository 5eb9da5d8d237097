use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// コメント済み動画IDの永続記録
///
/// 1行1件のテキストファイルを台帳とする追記専用ストア。
/// 投稿の確認が取れた直後に1件ずつ書き込み、まとめ書きはしない。
/// クラッシュや再実行をまたいでも同じ動画に二重投稿しないための記録なので、
/// 書き込みは`record`の呼び出し中に完了させる。
pub struct PostedVideos {
    path: PathBuf,
    ids: HashSet<String>,
}

impl PostedVideos {
    /// 記録ファイルを読み込む
    ///
    /// ファイルが存在しない場合は空の記録として扱う。
    /// 不正なUTF-8は損失許容で読み、壊れた行のために全体を失敗させない。
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let ids = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e),
        };

        log::info!("Loaded {} posted video IDs from {}", ids.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            ids,
        })
    }

    /// 動画IDがすでに記録されているかどうか
    pub fn contains(&self, video_id: &str) -> bool {
        self.ids.contains(video_id)
    }

    /// 記録済みIDの集合への参照を取得
    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    /// 動画IDを記録する
    ///
    /// ファイルへ追記してフラッシュしてからメモリ上の集合に加える。
    /// この順序により、書き込みが成功した場合のみ記録済み扱いになる。
    pub fn record(&mut self, video_id: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", video_id)?;
        file.flush()?;

        self.ids.insert(video_id.to_string());
        Ok(())
    }

    /// 記録済み件数を取得
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
