//! メディアメタデータのエンドポイント

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::domain::{new_document_id, now_timestamp, CreateMediaInput, Media, MEDIA_LIST_LIMIT};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::json::ValidJson;
use crate::http::state::AppState;

/// メディア一覧 (GET /media)
pub async fn list_media(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let media = state.media.list(MEDIA_LIST_LIMIT).await?;
    Ok(Json(json!({ "success": true, "media": media })))
}

/// メディア登録 (POST /media)
pub async fn create_media(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<CreateMediaInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = input.validate()?;

    let media = Media::new(new_document_id(), user.user_id, draft, now_timestamp());
    state.media.create(&media).await?;
    tracing::info!(media_id = %media.id, user_id = %media.uploaded_by, "メディアを登録");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Media created",
            "media": media,
        })),
    ))
}
