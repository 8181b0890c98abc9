use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use super::ApiResult;
use crate::{auth::Admin, response::RequestMeta, state::AppState};

pub const SUCCESS: &str = "The operation has been successful";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root_handler))
        .route("/system", get(self_handler))
        .route("/system/health", get(health_handler))
        .route("/system/admin-counts", get(admin_counts_handler))
}

pub async fn root_handler(meta: RequestMeta) -> ApiResult<()> {
    Ok(meta.empty("Welcome to the nursery backend"))
}

pub async fn self_handler(meta: RequestMeta) -> ApiResult<()> {
    Ok(meta.empty(SUCCESS))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationHealth {
    pub environment: &'static str,
    pub uptime: String,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub application: ApplicationHealth,
    pub time_stamp: i64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>, meta: RequestMeta) -> ApiResult<Health> {
    let environment = match state.config.environment.is_production() {
        true => "production",
        false => "development",
    };

    let health = Health {
        application: ApplicationHealth {
            environment,
            uptime: format!("{:.2} Second", state.started_at.elapsed().as_secs_f64()),
            version: env!("CARGO_PKG_VERSION"),
        },
        time_stamp: Utc::now().timestamp_millis(),
    };

    Ok(meta.ok(SUCCESS, health))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCounts {
    pub total_blogs: usize,
    pub total_names: usize,
}

pub async fn admin_counts_handler(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    _admin: Admin,
) -> ApiResult<AdminCounts> {
    let counts = AdminCounts {
        total_blogs: state.blogs.all().await?.len(),
        total_names: state.names.all().await?.len(),
    };

    Ok(meta.ok("Admin dashboard counts retrieved successfully", counts))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::tests::{Caller, send, test_app};

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();

        let (status, body) = send(&app, Method::GET, "/system/health", Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["application"]["environment"], "development");
        assert!(body["data"]["timeStamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_admin_counts_requires_admin() {
        let (app, _) = test_app();

        let (status, body) = send(&app, Method::GET, "/system/admin-counts", Caller::User, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied");

        let (status, body) = send(&app, Method::GET, "/system/admin-counts", Caller::Admin, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalNames"], 0);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _) = test_app();

        let (status, body) = send(&app, Method::GET, "/api/nope", Caller::Anonymous, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "route not found");
        assert_eq!(body["success"], false);
    }
}
