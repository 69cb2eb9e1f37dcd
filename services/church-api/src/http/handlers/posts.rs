//! 投稿とリアクションのエンドポイント

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::domain::{
    new_document_id, now_timestamp, CreatePostInput, Post, ReactInput, LATEST_POSTS_LIMIT,
};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::json::ValidJson;
use crate::http::state::AppState;
use crate::infrastructure::ReactionResult;

/// 最新投稿一覧 (GET /posts)
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_latest(LATEST_POSTS_LIMIT).await?;
    Ok(Json(json!({ "success": true, "posts": posts })))
}

/// 投稿作成 (POST /posts)
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<CreatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = input.validate()?;

    let post = Post::new(new_document_id(), user.user_id, draft, now_timestamp());
    state.posts.create(&post).await?;
    tracing::info!(post_id = %post.id, user_id = %post.author_id, "投稿を作成");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Post created",
            "post": post,
        })),
    ))
}

/// リアクション加算 (POST /posts/{postId}/react)
pub async fn react_to_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
    ValidJson(input): ValidJson<ReactInput>,
) -> Result<impl IntoResponse, ApiError> {
    let reaction = input.validate()?;

    match state.posts.increment_reaction(&post_id, &reaction).await? {
        ReactionResult::Incremented { count } => {
            tracing::info!(
                post_id = %post_id,
                user_id = %user.user_id,
                reaction = %reaction,
                count = count,
                "リアクションを加算"
            );
            Ok(Json(json!({
                "success": true,
                "postId": post_id,
                "reaction": reaction,
                "count": count,
            })))
        }
        ReactionResult::PostNotFound => {
            tracing::warn!(post_id = %post_id, "リアクション対象の投稿が存在しない");
            Err(ApiError::not_found("Post not found"))
        }
    }
}
