use super::candidate::SubtitleCandidate;

/// 排序字幕候選
///
/// 依序套用三次穩定排序，最後套用的鍵優先：
/// 1. 信任來源在前
/// 2. 分數由高到低
/// 3. 非 bad 在前
///
/// 最終順序：非 bad 優先，其次分數高者，同分時信任來源優先。
pub fn rank_candidates(candidates: &mut [SubtitleCandidate]) {
    candidates.sort_by(|a, b| b.trusted.cmp(&a.trusted));
    candidates.sort_by(|a, b| rank_score(b).total_cmp(&rank_score(a)));
    candidates.sort_by(|a, b| a.bad.cmp(&b.bad));
}

/// 非有限分數排在所有有效分數之後
fn rank_score(candidate: &SubtitleCandidate) -> f64 {
    if candidate.score.is_finite() {
        candidate.score
    } else {
        f64::NEG_INFINITY
    }
}

/// 選出最佳字幕；沒有候選時回傳 `None`
#[must_use]
pub fn select_best(mut candidates: Vec<SubtitleCandidate>) -> Option<SubtitleCandidate> {
    if candidates.len() > 1 {
        rank_candidates(&mut candidates);
    }
    candidates.into_iter().next()
}
