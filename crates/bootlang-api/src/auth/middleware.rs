//! Axum용 인증 추출기.
//!
//! 핸들러 인자로 현재 사용자/관리자를 주입합니다.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use bootlang_core::Principal;

use super::{require_admin, AuthError, SessionResolver};

/// 인증된 사용자 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn me(CurrentUser(user): CurrentUser) -> Json<UserInfo> {
///     Json(UserInfo::from(&user))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

/// 관리자 추출기. 일반 사용자는 403으로 거부됩니다.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

/// `Authorization: Bearer <token>` 헤더에서 토큰을 꺼냅니다.
///
/// 스킴 이름은 대소문자를 구분하지 않습니다.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionResolver: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AuthError::unauthorized("not authenticated"))?;

        let resolver = SessionResolver::from_ref(state);
        let principal = resolver.resolve(token).await?;

        Ok(CurrentUser(principal))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    SessionResolver: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(AdminUser(require_admin(principal)?))
    }
}
