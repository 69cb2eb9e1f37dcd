//! 教会・フォロー・教会イベントのエンドポイント

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::domain::{
    new_document_id, now_timestamp, Church, ChurchEvent, CreateChurchEventInput,
    CreateChurchInput, JoinOutcome, CHURCH_LIST_LIMIT,
};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::json::ValidJson;
use crate::http::state::AppState;

/// 教会一覧 (GET /churches)
pub async fn list_churches(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let churches = state.churches.list(CHURCH_LIST_LIMIT).await?;
    Ok(Json(json!({ "success": true, "churches": churches })))
}

/// 教会作成 (POST /churches)
///
/// 作成者が唯一のメンバーとなり、フォロワー数は1から始まる。
pub async fn create_church(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<CreateChurchInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = input.validate()?;

    let church = Church::founded(new_document_id(), user.user_id, draft, now_timestamp());
    state.churches.create(&church).await?;
    tracing::info!(church_id = %church.id, user_id = %church.owner_id, "教会を作成");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Church created",
            "church": church,
        })),
    ))
}

/// 教会取得 (GET /churches/{churchId})
pub async fn get_church(
    State(state): State<AppState>,
    Path(church_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let church = state
        .churches
        .get(&church_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Church not found"))?;

    Ok(Json(json!({ "success": true, "church": church })))
}

/// 教会フォロー (POST /churches/{churchId}/follow)
///
/// 既にメンバーなら何も変更せず成功を返す。
pub async fn follow_church(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(church_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let body = match state.membership.join(&church_id, &user.user_id).await? {
        JoinOutcome::Joined { follower_count } => json!({
            "success": true,
            "message": "Joined church",
            "alreadyMember": false,
            "followerCount": follower_count,
        }),
        JoinOutcome::AlreadyMember => json!({
            "success": true,
            "message": "Already a member",
            "alreadyMember": true,
        }),
    };

    Ok(Json(body))
}

/// 教会イベント作成 (POST /churches/{churchId}/events)
pub async fn create_church_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(church_id): Path<String>,
    ValidJson(input): ValidJson<CreateChurchEventInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = input.validate()?;

    if state.churches.get(&church_id).await?.is_none() {
        return Err(ApiError::not_found("Church not found"));
    }

    let event = ChurchEvent::new(
        church_id,
        new_document_id(),
        user.user_id,
        draft,
        now_timestamp(),
    );
    state.churches.create_event(&event).await?;
    tracing::info!(church_id = %event.church_id, event_id = %event.id, "教会イベントを作成");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Event created",
            "event": event,
        })),
    ))
}

/// 教会イベント一覧 (GET /churches/{churchId}/events)
pub async fn list_church_events(
    State(state): State<AppState>,
    Path(church_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if state.churches.get(&church_id).await?.is_none() {
        return Err(ApiError::not_found("Church not found"));
    }

    let events = state.churches.list_events(&church_id).await?;
    Ok(Json(json!({ "success": true, "events": events })))
}
