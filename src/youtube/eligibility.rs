use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::types::VideoCandidate;

/// コメント対象として適格な動画を選び出す
///
/// 入力の並び（新しい順）を保ったまま、候補ごとに次を判定する:
/// 1. コメント済み記録に含まれる動画は除外
/// 2. 公開から`comment_delay`経過していない動画は除外
///    （経過時間は動画の公開時刻に対して計算する。ちょうど経過した場合は適格）
///
/// 公開時刻がパースできない候補は適格外として除外する（クラッシュさせない）。
/// 結果は最新の`max_per_channel`件に切り詰める。
pub fn filter_eligible(
    candidates: Vec<VideoCandidate>,
    posted: &HashSet<String>,
    now: DateTime<Utc>,
    comment_delay: Duration,
    max_per_channel: usize,
) -> Vec<VideoCandidate> {
    let delay_secs = comment_delay.as_secs() as i64;

    let mut eligible: Vec<VideoCandidate> = candidates
        .into_iter()
        .filter(|video| {
            if posted.contains(&video.id) {
                return false;
            }

            let publish_time = match DateTime::parse_from_rfc3339(&video.published_at) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(e) => {
                    log::warn!(
                        "Rejecting video {} - unparseable publish time {:?}: {}",
                        video.id,
                        video.published_at,
                        e
                    );
                    return false;
                }
            };

            let age_secs = now.signed_duration_since(publish_time).num_seconds();
            if age_secs >= delay_secs {
                true
            } else {
                let hours_left = (delay_secs - age_secs) as f64 / 3600.0;
                log::info!(
                    "Video {} not yet eligible for commenting. {:.2} hours left.",
                    video.id,
                    hours_left
                );
                false
            }
        })
        .collect();

    eligible.truncate(max_per_channel);
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(id: &str, published_at: &str) -> VideoCandidate {
        VideoCandidate {
            id: id.to_string(),
            title: format!("video {}", id),
            published_at: published_at.to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    const THREE_HOURS: Duration = Duration::from_secs(3 * 60 * 60);

    #[test]
    fn test_age_gate_boundary() {
        // ちょうど3時間前は適格、1秒足りないと適格外
        let candidates = vec![
            candidate("exact", "2024-05-01T09:00:00Z"),
            candidate("one-sec-short", "2024-05-01T09:00:01Z"),
        ];

        let eligible = filter_eligible(candidates, &HashSet::new(), now(), THREE_HOURS, 3);

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, "exact");
    }

    #[test]
    fn test_already_posted_rejected() {
        let candidates = vec![
            candidate("old1", "2024-05-01T06:00:00Z"),
            candidate("old2", "2024-05-01T05:00:00Z"),
        ];
        let posted: HashSet<String> = ["old1".to_string()].into_iter().collect();

        let eligible = filter_eligible(candidates, &posted, now(), THREE_HOURS, 3);

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, "old2");
    }

    #[test]
    fn test_malformed_timestamp_rejected() {
        let candidates = vec![
            candidate("bad", "not-a-timestamp"),
            candidate("good", "2024-05-01T06:00:00Z"),
        ];

        let eligible = filter_eligible(candidates, &HashSet::new(), now(), THREE_HOURS, 3);

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, "good");
    }

    #[test]
    fn test_cap_preserves_recency_order() {
        // 10件の適格候補から最新3件のみ、入力順を保って返す
        let candidates: Vec<VideoCandidate> = (0..10)
            .map(|i| candidate(&format!("vid{}", i), &format!("2024-05-01T0{}:00:00Z", i % 9)))
            .collect();

        let eligible = filter_eligible(candidates, &HashSet::new(), now(), THREE_HOURS, 3);

        assert_eq!(eligible.len(), 3);
        assert_eq!(eligible[0].id, "vid0");
        assert_eq!(eligible[1].id, "vid1");
        assert_eq!(eligible[2].id, "vid2");
    }

    #[test]
    fn test_future_publish_time_not_eligible() {
        let candidates = vec![candidate("future", "2024-05-01T13:00:00Z")];

        let eligible = filter_eligible(candidates, &HashSet::new(), now(), THREE_HOURS, 3);

        assert!(eligible.is_empty());
    }

    #[test]
    fn test_mixed_ages_scenario() {
        // 4時間前の動画のみ適格、1時間前はまだ対象外
        let candidates = vec![
            candidate("one-hour", "2024-05-01T11:00:00Z"),
            candidate("four-hours", "2024-05-01T08:00:00Z"),
        ];

        let eligible = filter_eligible(candidates, &HashSet::new(), now(), THREE_HOURS, 3);

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, "four-hours");
    }
}
