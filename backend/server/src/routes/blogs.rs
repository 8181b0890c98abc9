use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiResult;
use crate::{
    auth::Principal,
    catalog::Page,
    error::AppError,
    models::{BlogDraft, BlogPatch, BlogPost, Category},
    response::RequestMeta,
    state::AppState,
    utils::{ApiJson, ApiQuery},
};

pub const BLOG_PAGE_LIMIT: usize = 10;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all", get(all_handler))
        .route("/{slug}", get(slug_handler))
        .route("/category/{category}", get(category_handler))
        .route("/search/{query}", get(search_handler))
        .route("/create", post(create_handler))
        .route("/update/{id}", put(update_handler))
        .route("/delete/{id}", delete(delete_handler))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct BlogPageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListing {
    pub blogs: Vec<BlogPost>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Newest first.
fn paginate(mut posts: Vec<BlogPost>, query: &BlogPageQuery) -> Result<BlogListing, AppError> {
    let page = Page::new(query.page, query.limit, BLOG_PAGE_LIMIT)?;

    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = posts.len();
    let blogs = posts.into_iter().skip(page.skip()).take(page.limit).collect();

    Ok(BlogListing {
        blogs,
        current_page: page.page,
        total_pages: total.div_ceil(page.limit),
        total,
    })
}

fn not_found_or_unauthorized() -> AppError {
    AppError::NotFound("Blog not found or unauthorized".into())
}

/// The post, if it exists and `principal` wrote it.
async fn owned(state: &AppState, principal: &Principal, id: &str) -> Result<BlogPost, AppError> {
    let id = id.parse().map_err(|_| not_found_or_unauthorized())?;

    state
        .blogs
        .get(id)
        .await?
        .filter(|post| post.author == principal.user_id)
        .ok_or_else(not_found_or_unauthorized)
}

pub async fn all_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(query): ApiQuery<BlogPageQuery>,
) -> ApiResult<BlogListing> {
    let listing = paginate(state.blogs.all().await?, &query)?;

    Ok(meta.ok("Blogs retrieved successfully", listing))
}

/// Published posts only. Each read counts as a view.
pub async fn slug_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(slug): Path<String>,
) -> ApiResult<BlogPost> {
    let post = state
        .blogs
        .find_by_slug(&slug)
        .await?
        .filter(BlogPost::is_published)
        .ok_or_else(|| AppError::not_found("Blog"))?;

    let post = state.blogs.record_view(post.id).await?.unwrap_or(post);

    Ok(meta.ok("Blog retrieved successfully", post))
}

pub async fn category_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(category): Path<String>,
    ApiQuery(query): ApiQuery<BlogPageQuery>,
) -> ApiResult<BlogListing> {
    let category: Category = category.parse()?;

    let posts = state
        .blogs
        .all()
        .await?
        .into_iter()
        .filter(|post| post.is_published() && post.category == category)
        .collect();
    let listing = paginate(posts, &query)?;

    Ok(meta.ok("Blogs retrieved successfully", listing))
}

fn mentions(post: &BlogPost, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(&post.title) || contains(&post.content) || post.tags.iter().any(|tag| contains(tag))
}

/// Case-insensitive match on title, content or tags. Bodies are left out of the results.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(query): Path<String>,
) -> ApiResult<Vec<BlogPost>> {
    let needle = query.to_lowercase();

    let mut posts: Vec<BlogPost> = state
        .blogs
        .all()
        .await?
        .into_iter()
        .filter(|post| post.is_published() && mentions(post, &needle))
        .map(BlogPost::summary)
        .collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(meta.ok("Search results retrieved successfully", posts))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    principal: Principal,
    ApiJson(draft): ApiJson<BlogDraft>,
) -> ApiResult<BlogPost> {
    let post = draft.into_post(principal.user_id, Utc::now())?;

    let post = state
        .blogs
        .insert(post)
        .await
        .map_err(|e| AppError::from(e).on_conflict("A blog with this title already exists"))?;
    info!("{} created blog {}", post.author, post.slug);

    Ok(meta.reply(StatusCode::CREATED, "Blog created successfully", post))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    principal: Principal,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<BlogPatch>,
) -> ApiResult<BlogPost> {
    let mut post = owned(&state, &principal, &id).await?;
    post.apply(patch, Utc::now())?;

    let post = state
        .blogs
        .replace(post)
        .await
        .map_err(|e| AppError::from(e).on_conflict("A blog with this title already exists"))?;

    Ok(meta.ok("Blog updated successfully", post))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let post = owned(&state, &principal, &id).await?;
    state.blogs.delete(post.id).await?;
    info!("{} deleted blog {}", principal.user_id, post.slug);

    Ok(meta.empty("Blog deleted successfully"))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use crate::routes::tests::{Caller, send, test_app};

    fn post(title: &str, status: &str) -> Value {
        json!({
            "title": title,
            "content": "Choosing a name ".repeat(20),
            "excerpt": "How to pick",
            "category": "baby-names",
            "tags": ["naming", "tips"],
            "featuredImage": { "url": "https://img.example/a.webp", "alt": "cover" },
            "status": status,
            "metaDescription": "Naming tips",
        })
    }

    async fn create(app: &axum::Router, caller: Caller, body: Value) -> Value {
        let (status, body) = send(app, Method::POST, "/api/blogs/create", caller, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    #[tokio::test]
    async fn test_published_slug_counts_views() {
        let (app, _) = test_app();
        let created = create(&app, Caller::User, post("Naming Your First Child", "published")).await;
        assert_eq!(created["slug"], "naming-your-first-child");
        assert_eq!(created["author"], "user-1");
        assert_eq!(created["readTime"], 1);

        send(&app, Method::GET, "/api/blogs/naming-your-first-child", Caller::Anonymous, None).await;
        let (status, body) =
            send(&app, Method::GET, "/api/blogs/naming-your-first-child", Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["views"], 2);

        create(&app, Caller::User, post("A draft about names", "draft")).await;
        let (status, _) = send(&app, Method::GET, "/api/blogs/a-draft-about-names", Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_and_category() {
        let (app, _) = test_app();
        create(&app, Caller::User, post("Naming Your First Child", "published")).await;
        create(&app, Caller::User, post("A draft about names", "draft")).await;

        let (status, body) = send(&app, Method::GET, "/api/blogs/search/TIPS", Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::OK);
        let results = body["data"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].get("content").is_none());

        let (_, body) = send(&app, Method::GET, "/api/blogs/category/baby-names", Caller::Anonymous, None).await;
        assert_eq!(body["data"]["total"], 1);

        let (status, _) = send(&app, Method::GET, "/api/blogs/category/recipes", Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, Method::GET, "/api/blogs/all?limit=1", Caller::Anonymous, None).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["totalPages"], 2);
    }

    #[tokio::test]
    async fn test_only_author_can_edit() {
        let (app, _) = test_app();
        let created = create(&app, Caller::User, post("Naming Your First Child", "published")).await;
        let id = created["id"].as_str().unwrap();

        let patch = json!({ "title": "Naming Your Second Child" });
        let (status, body) =
            send(&app, Method::PUT, &format!("/api/blogs/update/{id}"), Caller::Admin, Some(patch.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Blog not found or unauthorized");

        let (status, body) =
            send(&app, Method::PUT, &format!("/api/blogs/update/{id}"), Caller::User, Some(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["slug"], "naming-your-second-child");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/blogs/delete/{id}"), Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/blogs/delete/{id}"), Caller::User, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (app, _) = test_app();

        let (status, body) =
            send(&app, Method::POST, "/api/blogs/create", Caller::User, Some(post("Short", "draft"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Title must be at least 10 characters long");

        create(&app, Caller::User, post("Naming Your First Child", "draft")).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/blogs/create",
            Caller::User,
            Some(post("Naming your first child", "draft")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
