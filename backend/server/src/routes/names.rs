use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    sync::Arc,
};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use lexicon::{LetterAnalysis, numerology::is_valid_number, similarity};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::ApiResult;
use crate::{
    auth::Admin,
    catalog::{
        self, Counts, DEFAULT_LIMIT, MAX_LIMIT, NameFilter, NameSort, Page, Pagination, Statistics, TextMatch,
    },
    error::AppError,
    models::{Gender, NameDraft, checked_trend, NamePatch, NameRecord, Zodiac, ZodiacElement, ZodiacSign},
    response::RequestMeta,
    state::AppState,
    utils::{ApiJson, ApiQuery, parse_id, split_csv},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trending", get(trending_handler))
        .route("/count", get(count_handler))
        .route("/top", get(top_handler))
        .route("/slug/{slug}", get(slug_handler))
        .route("/region/{region}", get(region_handler))
        .route("/religion/{religion}", get(religion_handler))
        .route("/search", get(search_handler))
        .route("/meaning/{name}", get(meaning_handler))
        .route("/suggestions/parents", get(parents_handler))
        .route("/gender/{gender}", get(gender_handler))
        .route("/letter/{letter}", get(letter_handler))
        .route("/length/{length}", get(length_handler))
        .route("/origin/{origin}", get(origin_handler))
        .route("/numerology/{number}", get(numerology_handler))
        .route("/zodiac/{sign}", get(zodiac_handler))
        .route("/element/{element}", get(element_handler))
        .route("/generate", post(generate_handler))
        .route("/analysis/{name}", get(analysis_handler))
        .route("/similar/{name}", get(similar_handler))
        .route("/track-view/{id}", post(track_view_handler))
        .route("/track-search/{id}", post(track_search_handler))
        .route("/all", get(all_handler))
        .route("/create", post(create_handler))
        .route("/update/{slug}", put(update_handler))
        .route("/delete/{id}", delete(delete_handler))
        .route("/import", post(import_handler))
        .route("/trending/update", put(update_trends_handler))
        .route("/statistics", get(statistics_handler))
        .route("/bulk-update", post(bulk_update_handler))
}

#[derive(Serialize)]
pub struct Listing {
    pub names: Vec<NameRecord>,
    pub pagination: Pagination,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub gender: Option<Gender>,
}

impl PageQuery {
    fn page(&self) -> Result<Page, AppError> {
        Page::new(self.page, self.limit, DEFAULT_LIMIT)
    }
}

async fn listing(state: &AppState, filter: &NameFilter, sort: NameSort, page: &Page) -> Result<Listing, AppError> {
    let records = state.names.all().await?;
    let (names, total) = catalog::query(records, filter, sort, page);

    Ok(Listing {
        pagination: Pagination::new(page, names.len(), total),
        names,
    })
}

async fn find_by_name(state: &AppState, name: &str) -> Result<NameRecord, AppError> {
    state
        .names
        .find_by_name(name)
        .await?
        .ok_or_else(|| AppError::not_found("Name"))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct TrendingQuery {
    pub limit: Option<usize>,
    pub gender: Option<Gender>,
    pub origin: Option<String>,
}

pub async fn trending_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(query): ApiQuery<TrendingQuery>,
) -> ApiResult<Vec<NameRecord>> {
    let filter = NameFilter {
        gender: query.gender,
        origin: query.origin.map(TextMatch::Exact),
        ..NameFilter::default()
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let names = catalog::top(state.names.all().await?, &filter, NameSort::TRENDING, limit);
    if names.is_empty() {
        return Err(AppError::NotFound("No trending names found".into()));
    }

    Ok(meta.ok("Trending names retrieved successfully", names))
}

pub async fn count_handler(State(state): State<Arc<AppState>>, meta: RequestMeta) -> ApiResult<Counts> {
    let records = state.names.all().await?;

    Ok(meta.ok("Name counts retrieved successfully", catalog::counts(&records)))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct TopQuery {
    pub gender: Option<Gender>,
    pub limit: Option<i64>,
}

pub async fn top_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(query): ApiQuery<TopQuery>,
) -> ApiResult<Vec<NameRecord>> {
    let filter = NameFilter {
        gender: query.gender,
        ..NameFilter::default()
    };
    let limit = query
        .limit
        .filter(|limit| *limit != 0)
        .unwrap_or(DEFAULT_LIMIT as i64)
        .clamp(1, MAX_LIMIT as i64) as usize;

    let names = catalog::top(state.names.all().await?, &filter, NameSort::TRENDING, limit);
    if names.is_empty() {
        return Err(AppError::NotFound("No top names found".into()));
    }

    Ok(meta.ok("Top names retrieved successfully", names))
}

pub async fn slug_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(slug): Path<String>,
) -> ApiResult<NameRecord> {
    let record = state
        .names
        .find_by_slug(&slug.to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found("Name"))?;

    Ok(meta.ok("Name retrieved successfully", record))
}

pub async fn region_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(region): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let filter = NameFilter {
        gender: query.gender,
        regions_any: vec![region],
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by region retrieved successfully", listing))
}

pub async fn religion_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(religion): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let filter = NameFilter {
        gender: query.gender,
        religion_any: vec![religion],
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by religion retrieved successfully", listing))
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub gender: Option<Gender>,
    pub origin: Option<String>,
    pub religion: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Listing> {
    let text = query.query.unwrap_or_default();
    if text.chars().count() < 2 {
        return Err(AppError::Validation(
            "Search query must be at least 2 characters".into(),
        ));
    }

    let mut filter = NameFilter {
        gender: query.gender,
        origin: query.origin.map(TextMatch::Exact),
        religion_any: query.religion.into_iter().collect(),
        min_length: query.min_length,
        max_length: query.max_length,
        ..NameFilter::default()
    };

    match query.kind.as_deref().unwrap_or("prefix") {
        "prefix" => filter.name = Some(TextMatch::Prefix(text)),
        "suffix" => filter.name = Some(TextMatch::Suffix(text)),
        "contains" => filter.name = Some(TextMatch::Contains(text)),
        _ => {
            let ids = state.names.text_search(&text).await?;
            filter.ids = Some(ids.into_iter().collect::<HashSet<Uuid>>());
        }
    }

    let page = Page::new(query.page, query.limit, DEFAULT_LIMIT)?;
    let sort = NameSort::for_search(query.sort_by.as_deref());
    let listing = listing(&state, &filter, sort, &page).await?;

    if listing.names.is_empty() {
        return Err(AppError::NotFound("No names found matching your criteria".into()));
    }

    for record in &listing.names {
        state.names.record_search_appearance(record.id).await?;
    }

    Ok(meta.ok("Search results retrieved successfully", listing))
}

pub async fn meaning_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(name): Path<String>,
) -> ApiResult<NameRecord> {
    let record = match state.names.find_by_name(&name).await? {
        Some(record) => Some(record),
        None => state.names.find_by_slug(&name.to_lowercase()).await?,
    };
    let record = record.ok_or_else(|| AppError::not_found("Name"))?;

    Ok(meta.ok("Name meaning retrieved successfully", record))
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ParentsQuery {
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub gender: Option<Gender>,
}

pub const SUGGESTION_LIMIT: usize = 20;

pub async fn parents_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(query): ApiQuery<ParentsQuery>,
) -> ApiResult<Vec<NameRecord>> {
    let present = |name: Option<String>| name.filter(|name| !name.trim().is_empty());
    let parents: Vec<String> = [present(query.mother_name), present(query.father_name)]
        .into_iter()
        .flatten()
        .collect();

    let mut filter = NameFilter {
        gender: query.gender,
        ..NameFilter::default()
    };

    match parents.as_slice() {
        [] => {
            return Err(AppError::Validation(
                "At least one parent name is required".into(),
            ));
        }
        [parent] => {
            filter.first_letter = parent.trim().chars().next().map(lowercase);
        }
        _ => {
            let letters: HashSet<char> = parents
                .iter()
                .flat_map(|parent| parent.to_lowercase().chars().collect::<Vec<_>>())
                .filter(|c| c.is_alphabetic())
                .collect();
            filter.letters_any = letters.into_iter().collect();
        }
    }

    let names = catalog::top(state.names.all().await?, &filter, NameSort::ALPHABETICAL, SUGGESTION_LIMIT);

    Ok(meta.ok("Names suggestions retrieved successfully", names))
}

fn lowercase(letter: char) -> char {
    letter.to_lowercase().next().unwrap_or(letter)
}

pub async fn gender_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(gender): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let filter = NameFilter {
        gender: Some(gender.parse()?),
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by gender retrieved successfully", listing))
}

pub async fn letter_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(letter): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let mut chars = letter.chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(letter), None) => lowercase(letter),
        _ => return Err(AppError::Validation("Single letter is required".into())),
    };

    let filter = NameFilter {
        gender: query.gender,
        first_letter: Some(letter),
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by letter retrieved successfully", listing))
}

pub async fn length_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(length): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let length: usize = length
        .parse()
        .map_err(|_| AppError::Validation("Valid length number is required".into()))?;

    let filter = NameFilter {
        gender: query.gender,
        min_length: Some(length),
        max_length: Some(length),
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by length retrieved successfully", listing))
}

pub async fn origin_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(origin): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let filter = NameFilter {
        gender: query.gender,
        origin: Some(TextMatch::Contains(origin)),
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by origin retrieved successfully", listing))
}

pub async fn numerology_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(number): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let number = number
        .parse::<u32>()
        .ok()
        .filter(|number| is_valid_number(*number))
        .ok_or_else(|| {
            AppError::Validation("Valid numerology number (1-9, 11, 22, 33) is required".into())
        })?;

    let filter = NameFilter {
        gender: query.gender,
        numerology: Some(number),
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by numerology retrieved successfully", listing))
}

pub async fn zodiac_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(sign): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let sign: ZodiacSign = sign.parse()?;

    let filter = NameFilter {
        gender: query.gender,
        zodiac_sign: Some(sign),
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by zodiac retrieved successfully", listing))
}

pub async fn element_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(element): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing> {
    let element: ZodiacElement = element.parse()?;

    let filter = NameFilter {
        gender: query.gender,
        zodiac_element: Some(element),
        ..NameFilter::default()
    };
    let listing = listing(&state, &filter, NameSort::ALPHABETICAL, &query.page()?).await?;

    Ok(meta.ok("Names by element retrieved successfully", listing))
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateRequest {
    pub gender: Option<Gender>,
    pub religion: Option<String>,
    pub origin: Option<String>,
    pub characteristics: Vec<String>,
    pub preferred_length: Option<usize>,
    pub avoid_letters: Vec<String>,
}

pub const GENERATE_SIZE: usize = 10;

#[derive(Serialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub name: String,
    pub meaning: String,
    pub gender: Gender,
    pub origin: String,
    pub characteristics: Vec<String>,
    /// `popularity.score + popularity.trend`
    pub score: f64,
}

impl From<NameRecord> for Suggestion {
    fn from(record: NameRecord) -> Self {
        Self {
            id: record.id,
            score: record.popularity.score + record.popularity.trend,
            name: record.name,
            meaning: record.meaning,
            gender: record.gender,
            origin: record.origin,
            characteristics: record.characteristics,
        }
    }
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> ApiResult<Vec<Suggestion>> {
    let filter = NameFilter {
        gender: request.gender,
        religion_any: request.religion.into_iter().collect(),
        origin: request.origin.map(TextMatch::Exact),
        characteristics_any: request.characteristics,
        min_length: request.preferred_length.map(|length| length.saturating_sub(1)),
        max_length: request.preferred_length.map(|length| length + 1),
        avoid_first_letters: request
            .avoid_letters
            .iter()
            .flat_map(|letters| letters.chars())
            .collect(),
        ..NameFilter::default()
    };

    let pool = catalog::select(state.names.all().await?, &filter);
    let picked = catalog::sample(pool, GENERATE_SIZE, &mut rand::thread_rng());

    let mut suggestions: Vec<Suggestion> = picked.into_iter().map(Suggestion::from).collect();
    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(meta.ok("Name suggestions generated successfully", suggestions))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterReport {
    pub id: Uuid,
    pub name: String,
    pub letter_analysis: LetterAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zodiac: Option<Zodiac>,
}

pub async fn analysis_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(name): Path<String>,
) -> ApiResult<LetterReport> {
    let record = find_by_name(&state, &name).await?;

    let report = LetterReport {
        id: record.id,
        name: record.name,
        letter_analysis: record.letter_analysis,
        zodiac: record.zodiac,
    };

    Ok(meta.ok("Letter analysis retrieved successfully", report))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SimilarQuery {
    pub limit: Option<usize>,
}

pub const SIMILAR_LIMIT: usize = 10;

#[derive(Serialize)]
pub struct SimilarName {
    pub id: Uuid,
    pub name: String,
    pub meaning: String,
    pub gender: Gender,
    pub origin: String,
    pub similarity: u8,
}

pub async fn similar_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(name): Path<String>,
    ApiQuery(query): ApiQuery<SimilarQuery>,
) -> ApiResult<Vec<SimilarName>> {
    let source = find_by_name(&state, &name).await?;
    let profile = source.profile();
    let limit = query.limit.unwrap_or(SIMILAR_LIMIT).min(MAX_LIMIT);

    let pool: Vec<NameRecord> = state
        .names
        .all()
        .await?
        .into_iter()
        .filter(|candidate| {
            candidate.id != source.id
                && candidate.gender == source.gender
                && similarity::is_related(&profile, &candidate.profile())
        })
        .collect();
    let picked = catalog::sample(pool, limit, &mut rand::thread_rng());

    let similar = similarity::rank(&profile, picked, NameRecord::profile)
        .into_iter()
        .map(|(record, similarity)| SimilarName {
            id: record.id,
            name: record.name,
            meaning: record.meaning,
            gender: record.gender,
            origin: record.origin,
            similarity,
        })
        .collect();

    Ok(meta.ok("Similar names retrieved successfully", similar))
}

pub async fn track_view_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(id): Path<String>,
) -> ApiResult<NameRecord> {
    let record = state
        .names
        .record_view(parse_id(&id, "Name")?)
        .await?
        .ok_or_else(|| AppError::not_found("Name"))?;

    Ok(meta.ok("View count updated successfully", record))
}

pub async fn track_search_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(id): Path<String>,
) -> ApiResult<NameRecord> {
    let record = state
        .names
        .record_search_appearance(parse_id(&id, "Name")?)
        .await?
        .ok_or_else(|| AppError::not_found("Name"))?;

    Ok(meta.ok("Search appearance updated successfully", record))
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AllQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub gender: Option<String>,
    pub origin: Option<String>,
    pub region: Option<String>,
    pub religion: Option<String>,
    pub search_query: Option<String>,
}

pub async fn all_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    _admin: Admin,
    ApiQuery(query): ApiQuery<AllQuery>,
) -> ApiResult<Listing> {
    let gender = match query.gender.as_deref() {
        None | Some("") | Some("all") => None,
        Some(gender) => Some(gender.parse()?),
    };

    let filter = NameFilter {
        gender,
        origin: query.origin.map(TextMatch::Contains),
        regions_any: split_csv(query.region.as_deref()),
        religion_any: split_csv(query.religion.as_deref()),
        keyword: query.search_query.filter(|keyword| !keyword.is_empty()),
        ..NameFilter::default()
    };
    let sort = NameSort::for_admin(query.sort_by.as_deref(), query.order.as_deref());
    let page = Page::new(query.page, query.limit, DEFAULT_LIMIT)?;

    let listing = listing(&state, &filter, sort, &page).await?;

    Ok(meta.ok("Names retrieved successfully", listing))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Admin(admin): Admin,
    ApiJson(draft): ApiJson<NameDraft>,
) -> ApiResult<NameRecord> {
    let record = draft.into_record(Utc::now())?;

    let record = state
        .names
        .insert(record)
        .await
        .map_err(|e| AppError::from(e).on_conflict("Name already exists"))?;
    info!("{} created name {}", admin.user_id, record.slug);

    Ok(meta.reply(StatusCode::CREATED, "Name created successfully", record))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    _admin: Admin,
    Path(slug): Path<String>,
    ApiJson(patch): ApiJson<NamePatch>,
) -> ApiResult<NameRecord> {
    let mut record = state
        .names
        .find_by_slug(&slug.to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found("Name"))?;

    record.apply(patch, Utc::now())?;

    let record = state
        .names
        .replace(record)
        .await
        .map_err(|e| AppError::from(e).on_conflict("Name or slug already exists"))?;

    Ok(meta.ok("Name updated successfully", record))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Admin(admin): Admin,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let record = state
        .names
        .delete(parse_id(&id, "Name")?)
        .await?
        .ok_or_else(|| AppError::not_found("Name"))?;
    info!("{} deleted name {}", admin.user_id, record.slug);

    Ok(meta.empty("Name deleted successfully"))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ImportRequest {
    pub names: Vec<NameDraft>,
}

#[derive(Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub total: usize,
}

#[derive(Serialize)]
pub struct ImportFailure {
    pub index: usize,
    pub name: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct ImportErrors {
    pub message: String,
    pub details: Vec<ImportFailure>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ImportReport {
    Complete(ImportSummary),
    Partial {
        success: ImportSummary,
        error: ImportErrors,
    },
}

pub async fn import_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    _admin: Admin,
    ApiJson(request): ApiJson<ImportRequest>,
) -> ApiResult<ImportReport> {
    if request.names.is_empty() {
        return Err(AppError::Validation("Valid names array is required".into()));
    }

    let total = request.names.len();
    let now = Utc::now();
    let mut imported = 0;
    let mut details = Vec::new();

    for (index, draft) in request.names.into_iter().enumerate() {
        let name = draft.name.clone();

        let result = match draft.into_record(now) {
            Ok(record) => state.names.insert(record).await.map_err(AppError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => imported += 1,
            Err(e) => {
                let error = match e {
                    AppError::Conflict(_) => "Duplicate name".to_string(),
                    other => other.to_string(),
                };
                details.push(ImportFailure { index, name, error });
            }
        }
    }

    info!("Imported {imported} of {total} names");
    let summary = ImportSummary { imported, total };

    if details.is_empty() {
        return Ok(meta.reply(
            StatusCode::CREATED,
            "Names imported successfully",
            ImportReport::Complete(summary),
        ));
    }

    warn!("{} names could not be imported", details.len());
    let report = ImportReport::Partial {
        success: summary,
        error: ImportErrors {
            message: "Some names could not be imported".into(),
            details,
        },
    };

    Ok(meta.reply(StatusCode::MULTI_STATUS, "Names partially imported", report))
}

#[derive(Serialize)]
pub struct Modified {
    pub modified: usize,
    pub total: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendUpdate {
    pub name_id: String,
    pub trend: f64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct TrendsRequest {
    pub trends: Option<Vec<TrendUpdate>>,
}

pub async fn update_trends_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    _admin: Admin,
    ApiJson(request): ApiJson<TrendsRequest>,
) -> ApiResult<Modified> {
    let trends = request
        .trends
        .ok_or_else(|| AppError::Validation("Valid trends array is required".into()))?;
    for update in &trends {
        checked_trend(update.trend)?;
    }

    let mut modified = 0;
    for update in &trends {
        let Ok(id) = update.name_id.parse::<Uuid>() else {
            continue;
        };

        if state.names.set_trend(id, update.trend).await? {
            modified += 1;
        }
    }

    Ok(meta.ok(
        "Trending names updated successfully",
        Modified {
            modified,
            total: trends.len(),
        },
    ))
}

pub async fn statistics_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    _admin: Admin,
) -> ApiResult<Statistics> {
    let statistics = catalog::statistics(state.names.all().await?);

    Ok(meta.ok("Name statistics retrieved successfully", statistics))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperation {
    pub name_id: String,
    #[serde(default)]
    pub updates: NamePatch,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct BulkRequest {
    pub operations: Option<Vec<BulkOperation>>,
}

/// All or nothing: every patch is applied and every new name and slug checked before anything is stored.
/// Patches for the same id stack in order. Unknown ids are skipped.
pub async fn bulk_update_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    _admin: Admin,
    ApiJson(request): ApiJson<BulkRequest>,
) -> ApiResult<Modified> {
    let operations = request
        .operations
        .ok_or_else(|| AppError::Validation("Valid operations array is required".into()))?;

    let total = operations.len();
    let now = Utc::now();
    let mut order = Vec::new();
    let mut patched: HashMap<Uuid, NameRecord> = HashMap::new();
    let mut modified = 0;

    for operation in operations {
        let Ok(id) = operation.name_id.parse::<Uuid>() else {
            continue;
        };

        let record = match patched.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let Some(record) = state.names.get(id).await? else {
                    continue;
                };
                order.push(id);
                entry.insert(record)
            }
        };

        record.apply(operation.updates, now)?;
        modified += 1;
    }

    let batch = order.iter().filter_map(|id| patched.remove(id)).collect();
    state
        .names
        .replace_all(batch)
        .await
        .map_err(|e| AppError::from(e).on_conflict("Name or slug already exists"))?;

    Ok(meta.ok("Bulk update completed successfully", Modified { modified, total }))
}
