use std::sync::Arc;

use axum::Router;

use crate::{error::AppError, response::Reply, state::AppState};

pub mod blogs;
pub mod names;
pub mod system;

pub type ApiResult<T> = Result<Reply<T>, AppError>;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api/names", names::router())
        .nest("/api/blogs", blogs::router())
        .merge(system::router())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{
        app,
        auth::{ROLE_HEADER, USER_ID_HEADER},
        config::Config,
        state::AppState,
    };

    #[derive(Clone, Copy)]
    pub(crate) enum Caller {
        Anonymous,
        User,
        Admin,
    }

    pub(crate) fn test_app() -> (Router, Arc<AppState>) {
        let state = AppState::in_memory(Config::default());
        (app(state.clone()), state)
    }

    pub(crate) async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        caller: Caller,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);

        match caller {
            Caller::Anonymous => {}
            Caller::User => request = request.header(USER_ID_HEADER, "user-1"),
            Caller::Admin => {
                request = request
                    .header(USER_ID_HEADER, "admin-1")
                    .header(ROLE_HEADER, "admin")
            }
        }

        let body = match body {
            Some(json) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
