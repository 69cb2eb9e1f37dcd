//! 認証不要の静的エンドポイント

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{Datelike, Utc};
use serde_json::json;

use crate::http::error::ApiError;
use crate::http::state::AppState;

/// 死活確認 (GET /)
pub async fn liveness() -> &'static str {
    "Church API is running"
}

/// 今日の聖句 (GET /bible/verse-of-the-day)
///
/// UTCの通日で聖句リストを巡回する。
pub async fn verse_of_the_day(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let verse = state
        .static_content
        .verse_for_day(Utc::now().ordinal())
        .ok_or_else(|| ApiError::not_found("No verses configured"))?;

    Ok(Json(json!({ "success": true, "verse": verse })))
}

/// トレンド楽曲 (GET /music/trending)
pub async fn trending_music(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "songs": state.static_content.trending_songs,
    }))
}
