//! APIエラーハンドリング
//!
//! 統一されたエラーレスポンス形式を提供する。
//! すべてのエラーは`{success: false, error, message, errors?}`のJSONで返却される。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::MembershipError;
use crate::domain::{FieldError, ValidationErrors};
use crate::infrastructure::{AuthError, RepositoryError};

/// ストア障害時に利用者へ返す汎用メッセージ
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// APIエラーレスポンスのボディ
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// 常にfalse
    pub success: bool,
    /// エラー種別（例: "validation_error", "unauthorized", "not_found", "internal_error"）
    pub error: String,
    /// 詳細なエラーメッセージ
    pub message: String,
    /// フィールド単位のエラー（バリデーション失敗時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// APIエラー
///
/// ステータスコードとJSON形式のエラーボディを含む。
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    /// 新しいApiErrorを作成
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                success: false,
                error: error.into(),
                message: message.into(),
                errors: None,
            },
        }
    }

    /// 400 Bad Requestエラーを作成
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// 400 フィールド単位のバリデーションエラーを作成
    pub fn validation(errors: ValidationErrors) -> Self {
        let mut error = Self::new(StatusCode::BAD_REQUEST, "validation_error", "Validation failed");
        error.body.errors = Some(errors.errors().to_vec());
        error
    }

    /// 401 Unauthorizedエラーを作成
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    /// 403 Forbiddenエラーを作成
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    /// 404 Not Foundエラーを作成
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 500 Internal Server Errorを作成（詳細はログにのみ出す）
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            INTERNAL_ERROR_MESSAGE,
        )
    }

    /// 503 Service Unavailableエラーを作成
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", message)
    }

    /// エラー種別を取得
    pub fn error(&self) -> &str {
        &self.body.error
    }

    /// エラーメッセージを取得
    pub fn message(&self) -> &str {
        &self.body.message
    }

    /// ステータスコードを取得
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation(errors)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!(error = %err, "ストア操作エラー");
        ApiError::internal_error()
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::InvalidMember => {
                ApiError::validation(ValidationErrors::single("userId", "userId is required"))
            }
            MembershipError::CommunityNotFound(_) => ApiError::not_found("Church not found"),
            MembershipError::StoreUnavailable(detail) => {
                tracing::error!(error = %detail, "メンバーシップ更新失敗");
                ApiError::internal_error()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::unauthorized("Authorization header is required"),
            AuthError::InvalidToken => ApiError::unauthorized("Invalid token"),
            AuthError::TokenExpired => ApiError::unauthorized("Token expired"),
            AuthError::Unavailable(detail) => {
                tracing::error!(error = %detail, "トークン検証を実行できない");
                ApiError::service_unavailable("Authentication service unavailable")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn respond(error: ApiError) -> (StatusCode, Value) {
        let app = Router::new().route("/error", get(move || async move { error }));
        let request = Request::builder()
            .uri("/error")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_constructors() {
        let cases = [
            (ApiError::bad_request("x"), StatusCode::BAD_REQUEST, "bad_request"),
            (ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED, "unauthorized"),
            (ApiError::forbidden("x"), StatusCode::FORBIDDEN, "forbidden"),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND, "not_found"),
            (
                ApiError::service_unavailable("x"),
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
            ),
        ];
        for (error, status, kind) in cases {
            assert_eq!(error.status(), status);
            assert_eq!(error.error(), kind);
            assert_eq!(error.message(), "x");
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = respond(ApiError::not_found("Church not found")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Church not found");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("age", "age must be at least 18");
        errors.push("email", "email must contain @");

        let (status, body) = respond(ApiError::from(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["errors"][0]["field"], "age");
        assert_eq!(body["errors"][1]["message"], "email must contain @");
    }

    #[tokio::test]
    async fn test_repository_error_hides_detail() {
        let error = ApiError::from(RepositoryError::WriteError(
            "ProvisionedThroughputExceeded on table churches".to_string(),
        ));

        let (status, body) = respond(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_membership_error_mapping() {
        assert_eq!(
            ApiError::from(MembershipError::CommunityNotFound("c1".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(MembershipError::InvalidMember).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MembershipError::StoreUnavailable("down".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Unavailable("jwks".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
