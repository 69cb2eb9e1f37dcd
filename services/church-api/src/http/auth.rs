//! 認証ミドルウェア
//!
//! - Authorizationヘッダーからトークンを抽出
//! - トークン検証器で検証し、利用者を`AuthenticatedUser`としてリクエスト拡張に格納
//! - 不正なトークン時は401 Unauthorized（JSON形式）を返却
//!
//! 保護ルートにのみ`route_layer`で適用する。

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use crate::domain::AuthenticatedUser;
use crate::infrastructure::{AuthError, TokenVerifier};

/// Authorizationヘッダーの値からトークンを取り出す
///
/// `Bearer <token>` または `<token>` 形式をサポート。
fn extract_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// 認証ミドルウェア
///
/// # Returns
/// - 認証成功時: 利用者をリクエスト拡張に入れて次のハンドラーに渡す
/// - 認証失敗時: 401 Unauthorized（JSON形式）を返す
pub async fn auth_middleware(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token);

    let Some(token) = token else {
        tracing::warn!(path = %request.uri().path(), "認証ヘッダーがありません");
        return ApiError::from(AuthError::MissingToken).into_response();
    };

    match verifier.verify(token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.user_id, "認証成功");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), error = %e, "トークン検証失敗");
            ApiError::from(e).into_response()
        }
    }
}

/// 認証済み利用者の抽出子
///
/// `auth_middleware`の後段でのみ値が入る。無ければ401を返す。
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::DevTokenVerifier;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(CurrentUser(user): CurrentUser) -> String {
        user.user_id
    }

    fn create_test_router() -> Router {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(DevTokenVerifier);
        Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn_with_state(verifier, auth_middleware))
            .route("/open", get(|| async { "open" }))
    }

    async fn call(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri(uri).method("GET");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("abc"), Some("abc"));
        assert_eq!(extract_token("Bearer   "), None);
        assert_eq!(extract_token(""), None);
    }

    #[tokio::test]
    async fn test_bearer_token_sets_current_user() {
        let (status, body) = call(create_test_router(), "/me", Some("Bearer alice")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");
    }

    #[tokio::test]
    async fn test_raw_token_is_accepted() {
        let (status, body) = call(create_test_router(), "/me", Some("bob")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "bob");
    }

    #[tokio::test]
    async fn test_missing_header_returns_json_401() {
        let (status, body) = call(create_test_router(), "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_open_route_skips_auth() {
        let (status, body) = call(create_test_router(), "/open", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "open");
    }

    #[tokio::test]
    async fn test_current_user_without_middleware_is_401() {
        let app = Router::new().route("/me", get(whoami));
        let (status, _) = call(app, "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
