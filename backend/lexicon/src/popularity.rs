//! Popularity score.
//!
//! `score = views * 0.6 + search_appearances * 0.3 + trend * 0.1`
//!
//! The score is recomputed on view and search events only. Setting the trend leaves the score as it was until
//! the next event, so trend and score can disagree in between.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

pub const VIEW_WEIGHT: f64 = 0.6;
pub const SEARCH_WEIGHT: f64 = 0.3;
pub const TREND_WEIGHT: f64 = 0.1;

pub fn score(views: u64, search_appearances: u64, trend: f64) -> f64 {
    views as f64 * VIEW_WEIGHT + search_appearances as f64 * SEARCH_WEIGHT + trend * TREND_WEIGHT
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Popularity {
    pub score: f64,
    pub trend: f64,
    pub views: u64,
    pub search_appearances: u64,
}

impl Popularity {
    pub fn with_view(self) -> Self {
        let views = self.views + 1;

        Self {
            views,
            score: score(views, self.search_appearances, self.trend),
            ..self
        }
    }

    pub fn with_search_appearance(self) -> Self {
        let search_appearances = self.search_appearances + 1;

        Self {
            search_appearances,
            score: score(self.views, search_appearances, self.trend),
            ..self
        }
    }

    /// Overwrites the trend only.
    pub fn with_trend(self, trend: f64) -> Self {
        Self { trend, ..self }
    }
}

/// Trend first, then score, both descending.
pub fn by_trending(a: &Popularity, b: &Popularity) -> Ordering {
    b.trend
        .total_cmp(&a.trend)
        .then_with(|| b.score.total_cmp(&a.score))
}

/// Score descending.
pub fn by_score(a: &Popularity, b: &Popularity) -> Ordering {
    b.score.total_cmp(&a.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn popularity(views: u64, search_appearances: u64, trend: f64) -> Popularity {
        Popularity {
            score: score(views, search_appearances, trend),
            trend,
            views,
            search_appearances,
        }
    }

    #[test]
    fn test_view_recomputes_score() {
        let updated = popularity(10, 5, 2.0).with_view();

        assert_eq!(updated.views, 11);
        assert_eq!(updated.search_appearances, 5);
        assert!((updated.score - 8.3).abs() < 1e-9, "{}", updated.score);
    }

    #[test]
    fn test_search_appearance_recomputes_score() {
        let updated = popularity(10, 5, 2.0).with_search_appearance();

        assert_eq!(updated.search_appearances, 6);
        assert!((updated.score - (6.0 + 1.8 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_score_uses_current_counters_not_stale_score() {
        // stored score out of date after a trend change
        let stale = popularity(4, 2, 0.0).with_trend(50.0);
        assert!((stale.score - 3.0).abs() < 1e-9);

        let updated = stale.with_view();
        assert!((updated.score - (3.0 + 0.6 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_under_events() {
        let mut current = popularity(0, 0, 1.5);
        for step in 0..20 {
            let next = if step % 3 == 0 {
                current.with_search_appearance()
            } else {
                current.with_view()
            };
            assert!(next.score >= current.score);
            current = next;
        }
    }

    #[test]
    fn test_trend_does_not_touch_score() {
        let before = popularity(3, 3, 1.0);
        let after = before.with_trend(9.0);

        assert_eq!(after.trend, 9.0);
        assert_eq!(after.score, before.score);
        assert_eq!(after.views, before.views);
    }

    #[test]
    fn test_orderings() {
        let mut items = vec![
            popularity(1, 0, 5.0),
            popularity(9, 0, 0.0),
            popularity(2, 0, 5.0),
        ];

        items.sort_by(by_trending);
        assert_eq!(items.iter().map(|p| p.views).collect::<Vec<_>>(), [2, 1, 9]);

        items.sort_by(by_score);
        assert_eq!(items.iter().map(|p| p.views).collect::<Vec<_>>(), [9, 2, 1]);
    }
}
