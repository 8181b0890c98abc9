//! # Principal
//!
//! Sessions are verified upstream. The proxy forwards the caller as two headers:
//! - `x-user-id`: the account id, used as blog author
//! - `x-user-role`: `admin` or anything else
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    fn parse(value: &str) -> Self {
        match value.eq_ignore_ascii_case("admin") {
            true => Role::Admin,
            false => Role::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no session".into()))?;

        Ok(Self {
            user_id: user_id.to_string(),
            role: header(parts, ROLE_HEADER).map_or(Role::User, Role::parse),
        })
    }
}

/// A principal with the admin role.
#[derive(Debug, Clone)]
pub struct Admin(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;

        if principal.role != Role::Admin {
            return Err(AppError::Forbidden("Access denied".into()));
        }

        Ok(Self(principal))
    }
}
