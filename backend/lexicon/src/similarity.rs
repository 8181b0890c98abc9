//! Name-to-name similarity.
//!
//! | criterion              | weight |
//! |------------------------|--------|
//! | same origin            | 2      |
//! | same length            | 1      |
//! | same numerology number | 1      |

pub const ORIGIN_WEIGHT: u8 = 2;
pub const LENGTH_WEIGHT: u8 = 1;
pub const NUMEROLOGY_WEIGHT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile<'a> {
    pub origin: &'a str,
    pub length: usize,
    pub numerology: u32,
}

pub fn similarity(source: &Profile, candidate: &Profile) -> u8 {
    let mut total = 0;

    if source.origin == candidate.origin {
        total += ORIGIN_WEIGHT;
    }
    if source.length == candidate.length {
        total += LENGTH_WEIGHT;
    }
    if source.numerology == candidate.numerology {
        total += NUMEROLOGY_WEIGHT;
    }

    total
}

/// Whether `candidate` shares at least one criterion with `source`.
pub fn is_related(source: &Profile, candidate: &Profile) -> bool {
    similarity(source, candidate) > 0
}

/// Scores every candidate and sorts descending by score. Ties keep their input order.
pub fn rank<T, F>(source: &Profile, candidates: Vec<T>, profile: F) -> Vec<(T, u8)>
where
    F: Fn(&T) -> Profile<'_>,
{
    let mut scored: Vec<(T, u8)> = candidates
        .into_iter()
        .map(|candidate| {
            let score = similarity(source, &profile(&candidate));
            (candidate, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(origin: &str, length: usize, numerology: u32) -> Profile<'_> {
        Profile {
            origin,
            length,
            numerology,
        }
    }

    #[test]
    fn test_weights() {
        let source = profile("latin", 3, 6);

        assert_eq!(similarity(&source, &profile("latin", 3, 6)), 4);
        assert_eq!(similarity(&source, &profile("latin", 5, 1)), 2);
        assert_eq!(similarity(&source, &profile("greek", 3, 6)), 2);
        assert_eq!(similarity(&source, &profile("greek", 3, 1)), 1);
        assert_eq!(similarity(&source, &profile("greek", 4, 1)), 0);
        assert!(!is_related(&source, &profile("greek", 4, 1)));
    }

    #[test]
    fn test_rank_orders_by_score() {
        let source = profile("latin", 3, 6);
        let candidates = vec![
            ("Eve", "hebrew", 3, 9),
            ("Ada", "latin", 3, 6),
            ("Amy", "latin", 3, 6),
            ("Luna", "latin", 4, 1),
        ];

        let ranked = rank(&source, candidates, |c| profile(c.1, c.2, c.3));
        let names: Vec<_> = ranked.iter().map(|(c, s)| (c.0, *s)).collect();

        assert_eq!(names, [("Ada", 4), ("Amy", 4), ("Luna", 2), ("Eve", 1)]);
    }
}
