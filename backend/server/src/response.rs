use std::{convert::Infallible, sync::Arc};

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::state::AppState;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone, Serialize)]
pub struct RequestInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub method: String,
    pub url: String,
}

/// Echo of the request, attached to every success envelope. The client ip is dropped in production.
pub struct RequestMeta(pub RequestInfo);

impl FromRequestParts<Arc<AppState>> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let ip = match state.config.environment.is_production() {
            true => None,
            false => parts
                .headers
                .get(FORWARDED_FOR)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|ip| ip.trim().to_string()),
        };

        let url = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.to_string())
            .unwrap_or_else(|| parts.uri.to_string());

        Ok(Self(RequestInfo {
            ip,
            method: parts.method.to_string(),
            url,
        }))
    }
}

impl RequestMeta {
    pub fn ok<T: Serialize>(self, message: &str, data: T) -> Reply<T> {
        self.reply(StatusCode::OK, message, data)
    }

    pub fn reply<T: Serialize>(self, status: StatusCode, message: &str, data: T) -> Reply<T> {
        Reply {
            status,
            request: self.0,
            message: message.to_string(),
            data: Some(data),
        }
    }

    /// Success with `data: null`.
    pub fn empty(self, message: &str) -> Reply<()> {
        Reply {
            status: StatusCode::OK,
            request: self.0,
            message: message.to_string(),
            data: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    success: bool,
    status_code: u16,
    request: RequestInfo,
    message: String,
    data: Option<T>,
}

pub struct Reply<T> {
    status: StatusCode,
    request: RequestInfo,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            success: true,
            status_code: self.status.as_u16(),
            request: self.request,
            message: self.message,
            data: self.data,
        };

        (self.status, Json(body)).into_response()
    }
}
