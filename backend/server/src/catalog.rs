//! # Catalog
//!
//! Name queries over a snapshot of records: filtering, ordering, pagination, sampling and statistics.
//!
//! Every store hands its full record set to these functions, so query semantics do not depend on the backend.
//! The name set is small (a few thousand entries), which keeps a scan per request cheap.
use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use lexicon::popularity::{by_score, by_trending};
use rand::{Rng, seq::SliceRandom};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Gender, NameRecord, ZodiacElement, ZodiacSign},
};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 200;

/// String predicates. Everything except `Exact` ignores case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl TextMatch {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            TextMatch::Exact(expected) => value == expected,
            TextMatch::Prefix(prefix) => value.to_lowercase().starts_with(&prefix.to_lowercase()),
            TextMatch::Suffix(suffix) => value.to_lowercase().ends_with(&suffix.to_lowercase()),
            TextMatch::Contains(needle) => value.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

/// Conjunction of optional criteria; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    pub gender: Option<Gender>,
    pub origin: Option<TextMatch>,
    pub name: Option<TextMatch>,
    /// Case-insensitive substring of name or meaning.
    pub keyword: Option<String>,
    pub religion_any: Vec<String>,
    pub regions_any: Vec<String>,
    pub characteristics_any: Vec<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub first_letter: Option<char>,
    /// Excludes names whose first letter is in this set (case-insensitive).
    pub avoid_first_letters: Vec<char>,
    /// Keeps names containing at least one of these letters (case-insensitive).
    pub letters_any: Vec<char>,
    pub numerology: Option<u32>,
    pub zodiac_sign: Option<ZodiacSign>,
    pub zodiac_element: Option<ZodiacElement>,
    pub ids: Option<HashSet<Uuid>>,
    pub exclude: Option<Uuid>,
}

fn any_of(wanted: &[String], present: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|value| present.contains(value))
}

impl NameFilter {
    pub fn matches(&self, record: &NameRecord) -> bool {
        let length = record.metadata.length;
        let first = record.metadata.first_letter;
        let zodiac = record.zodiac.as_ref();

        self.gender.is_none_or(|gender| record.gender == gender)
            && self.origin.as_ref().is_none_or(|m| m.matches(&record.origin))
            && self.name.as_ref().is_none_or(|m| m.matches(&record.name))
            && self.keyword.as_ref().is_none_or(|keyword| {
                let keyword = TextMatch::Contains(keyword.clone());
                keyword.matches(&record.name) || keyword.matches(&record.meaning)
            })
            && any_of(&self.religion_any, &record.religion)
            && any_of(&self.regions_any, &record.regions)
            && any_of(&self.characteristics_any, &record.characteristics)
            && self.min_length.is_none_or(|min| length >= min)
            && self.max_length.is_none_or(|max| length <= max)
            && self.first_letter.is_none_or(|letter| first == letter)
            && !self
                .avoid_first_letters
                .iter()
                .any(|letter| letter.to_lowercase().eq(first.to_lowercase()))
            && (self.letters_any.is_empty()
                || record
                    .name
                    .to_lowercase()
                    .chars()
                    .any(|c| self.letters_any.contains(&c)))
            && self.numerology.is_none_or(|n| record.numerology.number == n)
            && self
                .zodiac_sign
                .is_none_or(|sign| zodiac.and_then(|z| z.sign) == Some(sign))
            && self
                .zodiac_element
                .is_none_or(|element| zodiac.and_then(|z| z.element) == Some(element))
            && self.ids.as_ref().is_none_or(|ids| ids.contains(&record.id))
            && self.exclude != Some(record.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Score,
    /// Trend then score, always descending.
    Trending,
    Name,
    Length,
    CreatedAt,
    Views,
    Trend,
    SearchAppearances,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameSort {
    pub key: SortKey,
    pub order: Order,
}

impl NameSort {
    pub const POPULAR: Self = Self::new(SortKey::Score, Order::Desc);
    pub const TRENDING: Self = Self::new(SortKey::Trending, Order::Desc);
    pub const ALPHABETICAL: Self = Self::new(SortKey::Name, Order::Asc);
    pub const SHORTEST: Self = Self::new(SortKey::Length, Order::Asc);

    pub const fn new(key: SortKey, order: Order) -> Self {
        Self { key, order }
    }

    /// `popularity` (default), `name` or `length`, as offered by search.
    pub fn for_search(sort_by: Option<&str>) -> Self {
        match sort_by {
            Some("name") => Self::ALPHABETICAL,
            Some("length") => Self::SHORTEST,
            _ => Self::POPULAR,
        }
    }

    /// Admin listing, `sortBy` + `order`. Unknown keys fall back to creation time.
    pub fn for_admin(sort_by: Option<&str>, order: Option<&str>) -> Self {
        let key = match sort_by.unwrap_or("createdAt") {
            "views" => SortKey::Views,
            "score" => SortKey::Score,
            "trend" => SortKey::Trend,
            "searchAppearances" => SortKey::SearchAppearances,
            "name" => SortKey::Name,
            "length" => SortKey::Length,
            _ => SortKey::CreatedAt,
        };
        let order = match order {
            Some("asc") => Order::Asc,
            _ => Order::Desc,
        };

        Self::new(key, order)
    }

    pub fn compare(&self, a: &NameRecord, b: &NameRecord) -> Ordering {
        let (pa, pb) = (&a.popularity, &b.popularity);

        let ascending = match self.key {
            SortKey::Trending => return by_trending(pa, pb),
            // by_score is descending
            SortKey::Score => by_score(pb, pa),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Length => a.metadata.length.cmp(&b.metadata.length),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Views => pa.views.cmp(&pb.views),
            SortKey::Trend => pa.trend.total_cmp(&pb.trend),
            SortKey::SearchAppearances => pa.search_appearances.cmp(&pb.search_appearances),
        };

        match self.order {
            Order::Asc => ascending,
            Order::Desc => ascending.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Page {
    /// Page numbers start at 1. Limits above [`MAX_LIMIT`] are clamped.
    pub fn new(page: Option<usize>, limit: Option<usize>, default_limit: usize) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if page == 0 || limit == 0 {
            return Err(AppError::Validation("page and limit must be positive".into()));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    pub fn skip(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(page: &Page, returned: usize, total: usize) -> Self {
        Self {
            current_page: page.page,
            total_pages: total.div_ceil(page.limit),
            total_items: total,
            has_more: page.skip() + returned < total,
        }
    }
}

pub fn select(records: Vec<NameRecord>, filter: &NameFilter) -> Vec<NameRecord> {
    records
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect()
}

pub fn sort(records: &mut [NameRecord], sort: NameSort) {
    records.sort_by(|a, b| sort.compare(a, b).then_with(|| a.name.cmp(&b.name)));
}

/// Filter, sort, then cut one page. Returns the page and the total number of matches.
pub fn query(
    records: Vec<NameRecord>,
    filter: &NameFilter,
    order: NameSort,
    page: &Page,
) -> (Vec<NameRecord>, usize) {
    let mut matched = select(records, filter);
    sort(&mut matched, order);

    let total = matched.len();
    let names = matched.into_iter().skip(page.skip()).take(page.limit).collect();

    (names, total)
}

/// Filter, sort, keep the first `limit`.
pub fn top(records: Vec<NameRecord>, filter: &NameFilter, order: NameSort, limit: usize) -> Vec<NameRecord> {
    let mut matched = select(records, filter);
    sort(&mut matched, order);
    matched.truncate(limit);

    matched
}

/// Uniform sample without replacement, in random order.
pub fn sample<R: Rng + ?Sized>(mut records: Vec<NameRecord>, size: usize, rng: &mut R) -> Vec<NameRecord> {
    records.shuffle(rng);
    records.truncate(size);

    records
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket<K> {
    pub key: K,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trending {
    pub id: Uuid,
    pub name: String,
    pub trend: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_names: usize,
    pub gender_distribution: Vec<Bucket<Gender>>,
    /// Ten most common origins.
    pub origin_distribution: Vec<Bucket<String>>,
    pub length_distribution: Vec<Bucket<usize>>,
    /// Twenty best scores.
    pub popularity_trends: Vec<Trending>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub boy: usize,
    pub girl: usize,
    pub unisex: usize,
}

pub fn counts(records: &[NameRecord]) -> Counts {
    let of = |gender: Gender| records.iter().filter(|r| r.gender == gender).count();

    Counts {
        total: records.len(),
        boy: of(Gender::Boy),
        girl: of(Gender::Girl),
        unisex: of(Gender::Unisex),
    }
}

fn tally<K, F>(records: &[NameRecord], key: F) -> Vec<Bucket<K>>
where
    K: std::hash::Hash + Eq,
    F: Fn(&NameRecord) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for record in records {
        *counts.entry(key(record)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(key, count)| Bucket { key, count })
        .collect()
}

pub fn statistics(mut records: Vec<NameRecord>) -> Statistics {
    let mut gender_distribution = tally(&records, |r| r.gender);
    gender_distribution.sort_by_key(|bucket| bucket.key.as_str());

    let mut origin_distribution = tally(&records, |r| r.origin.clone());
    origin_distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    origin_distribution.truncate(10);

    let mut length_distribution = tally(&records, |r| r.metadata.length);
    length_distribution.sort_by_key(|bucket| bucket.key);

    sort(&mut records, NameSort::POPULAR);
    let total_names = records.len();
    let popularity_trends = records
        .into_iter()
        .take(20)
        .map(|record| Trending {
            id: record.id,
            trend: record.popularity.trend,
            score: record.popularity.score,
            name: record.name,
        })
        .collect();

    Statistics {
        total_names,
        gender_distribution,
        origin_distribution,
        length_distribution,
        popularity_trends,
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::models::{Zodiac, name::tests::record};

    fn names(records: &[NameRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn fixture() -> Vec<NameRecord> {
        let mut ava = record("Ava", Gender::Girl, "latin");
        ava.religion = vec!["christian".into()];
        ava.popularity.score = 5.0;

        let mut max = record("Max", Gender::Boy, "latin");
        max.popularity.trend = 9.0;
        max.popularity.score = 1.0;
        max.regions = vec!["europe".into()];

        let mut noor = record("Noor", Gender::Unisex, "Arabic");
        noor.meaning = "light".into();
        noor.popularity.score = 3.0;
        noor.zodiac = Some(Zodiac {
            sign: Some(ZodiacSign::Leo),
            element: Some(ZodiacElement::Fire),
            qualities: vec![],
        });

        let mut olivia = record("Olivia", Gender::Girl, "latin");
        olivia.popularity.trend = 9.0;
        olivia.popularity.score = 2.0;

        vec![ava, max, noor, olivia]
    }

    #[test]
    fn test_text_match() {
        assert!(TextMatch::Prefix("OL".into()).matches("Olivia"));
        assert!(TextMatch::Suffix("IA".into()).matches("Olivia"));
        assert!(TextMatch::Contains("liv".into()).matches("Olivia"));
        assert!(TextMatch::Exact("latin".into()).matches("latin"));
        assert!(!TextMatch::Exact("latin".into()).matches("Latin"));
    }

    #[test]
    fn test_filters() {
        let by = |filter: NameFilter| names(&select(fixture(), &filter)).join(",");

        assert_eq!(
            by(NameFilter {
                gender: Some(Gender::Girl),
                ..NameFilter::default()
            }),
            "Ava,Olivia"
        );
        assert_eq!(
            by(NameFilter {
                origin: Some(TextMatch::Contains("arab".into())),
                ..NameFilter::default()
            }),
            "Noor"
        );
        assert_eq!(
            by(NameFilter {
                keyword: Some("LIGHT".into()),
                ..NameFilter::default()
            }),
            "Noor"
        );
        assert_eq!(
            by(NameFilter {
                min_length: Some(4),
                max_length: Some(4),
                ..NameFilter::default()
            }),
            "Noor"
        );
        assert_eq!(
            by(NameFilter {
                religion_any: vec!["christian".into(), "hindu".into()],
                ..NameFilter::default()
            }),
            "Ava"
        );
        assert_eq!(
            by(NameFilter {
                avoid_first_letters: vec!['A', 'n', 'o'],
                ..NameFilter::default()
            }),
            "Max"
        );
        assert_eq!(
            by(NameFilter {
                zodiac_element: Some(ZodiacElement::Fire),
                ..NameFilter::default()
            }),
            "Noor"
        );
        assert_eq!(
            by(NameFilter {
                letters_any: vec!['x', 'r'],
                ..NameFilter::default()
            }),
            "Max,Noor"
        );
    }

    #[test]
    fn test_orderings() {
        let mut records = fixture();

        sort(&mut records, NameSort::TRENDING);
        assert_eq!(names(&records), ["Olivia", "Max", "Ava", "Noor"]);

        sort(&mut records, NameSort::POPULAR);
        assert_eq!(names(&records), ["Ava", "Noor", "Olivia", "Max"]);

        sort(&mut records, NameSort::SHORTEST);
        assert_eq!(names(&records), ["Ava", "Max", "Noor", "Olivia"]);

        sort(&mut records, NameSort::for_admin(Some("trend"), Some("asc")));
        assert_eq!(names(&records)[..2], ["Ava", "Noor"]);
    }

    #[test]
    fn test_pagination() {
        let page = Page::new(Some(2), Some(3), DEFAULT_LIMIT).unwrap();
        let (names_page, total) = query(fixture(), &NameFilter::default(), NameSort::ALPHABETICAL, &page);

        assert_eq!(names(&names_page), ["Olivia"]);
        assert_eq!(total, 4);

        let pagination = Pagination::new(&page, names_page.len(), total);
        assert_eq!(pagination.total_pages, 2);
        assert!(!pagination.has_more);

        let first = Page::new(None, Some(3), DEFAULT_LIMIT).unwrap();
        assert!(Pagination::new(&first, 3, total).has_more);

        assert!(Page::new(Some(0), None, DEFAULT_LIMIT).is_err());
        assert_eq!(Page::new(None, Some(10_000), DEFAULT_LIMIT).unwrap().limit, MAX_LIMIT);
    }

    #[test]
    fn test_sample() {
        let mut rng = StdRng::seed_from_u64(7);

        let picked = sample(fixture(), 2, &mut rng);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0].id, picked[1].id);

        assert_eq!(sample(fixture(), 10, &mut rng).len(), 4);
    }

    #[test]
    fn test_statistics() {
        let stats = statistics(fixture());

        assert_eq!(stats.total_names, 4);
        assert_eq!(stats.origin_distribution[0], Bucket { key: "latin".to_string(), count: 3 });
        assert_eq!(
            stats.length_distribution,
            [Bucket { key: 3, count: 2 }, Bucket { key: 4, count: 1 }, Bucket { key: 6, count: 1 }]
        );
        assert_eq!(stats.popularity_trends[0].name, "Ava");
        assert_eq!(
            counts(&fixture()),
            Counts {
                total: 4,
                boy: 1,
                girl: 2,
                unisex: 1
            }
        );
    }
}
