use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;

use crate::model::UserContext;

const USER_ID_HEADER: &str = "x-user-id";
const USER_EMAIL_HEADER: &str = "x-user-email";
const USER_NAME_HEADER: &str = "x-user-name";

/// Reads the submitting officer from `X-User-Id`, `X-User-Email` and
/// `X-User-Name`. Session handling lives in front of this service, so a
/// request without a user id falls back to the development user.
#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(user_from_headers(&parts.headers))
    }
}

pub fn user_from_headers(headers: &HeaderMap) -> UserContext {
    match header_value(headers, USER_ID_HEADER) {
        Some(user_id) => UserContext::with_details(
            user_id,
            header_value(headers, USER_EMAIL_HEADER),
            header_value(headers, USER_NAME_HEADER),
        ),
        None => UserContext::default_user(),
    }
}

/// Trimmed header value; blank values count as absent
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
