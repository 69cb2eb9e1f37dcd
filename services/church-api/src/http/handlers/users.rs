//! ユーザープロフィール・検索・友達リクエストのエンドポイント

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{
    now_timestamp, FriendRequest, FriendRequestInput, SignupProfileInput, ValidationErrors,
};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::json::ValidJson;
use crate::http::state::AppState;
use crate::infrastructure::USER_SEARCH_LIMIT;

/// プロフィール登録・更新 (POST /signup-profile)
///
/// # Returns
/// - 201 Created: 保存したプロフィール
/// - 400 Bad Request: バリデーション失敗（フィールド単位のエラー一覧）
pub async fn signup_profile(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<SignupProfileInput>,
) -> Result<impl IntoResponse, ApiError> {
    let update = input.validate()?;

    let profile = state.users.save_profile(&update, &now_timestamp()).await?;
    tracing::info!(user_id = %profile.user_id, "プロフィールを保存");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Profile saved",
            "profile": profile,
        })),
    ))
}

/// 検索クエリ
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// 名前の前方一致検索 (GET /users/search?q=)
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let prefix = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ValidationErrors::single("q", "q is required"))?;

    let users = state
        .users
        .search_by_name_prefix(&prefix, USER_SEARCH_LIMIT)
        .await?;
    tracing::debug!(prefix = %prefix, count = users.len(), "ユーザー検索");

    Ok(Json(json!({ "success": true, "users": users })))
}

/// プロフィール取得 (GET /users/{userId})
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "success": true, "profile": profile })))
}

/// 友達リクエスト送信 (POST /users/friend-request)
///
/// senderIdを省略すると呼び出し元が送信者になる。他人を送信者にすることはできない。
pub async fn send_friend_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<FriendRequestInput>,
) -> Result<impl IntoResponse, ApiError> {
    let parties = input.validate(&user.user_id)?;
    if parties.sender_id != user.user_id {
        tracing::warn!(
            user_id = %user.user_id,
            sender_id = %parties.sender_id,
            "他人名義の友達リクエスト"
        );
        return Err(ApiError::forbidden(
            "Cannot send a friend request on behalf of another user",
        ));
    }

    let request = FriendRequest::pending(parties.sender_id, parties.recipient_id, now_timestamp());
    state.friend_requests.put(&request).await?;
    tracing::info!(request_id = %request.id, "友達リクエストを保存");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Friend request sent",
            "request": request,
        })),
    ))
}
