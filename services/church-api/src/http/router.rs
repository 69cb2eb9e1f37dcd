//! ルーター構築
//!
//! 認証不要のルートと、`route_layer`で認証ミドルウェアを適用した保護ルートをまとめる。
//! TraceLayerによりリクエスト/レスポンスの構造化ログを自動記録する。

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::auth::auth_middleware;
use super::error::ApiError;
use super::handlers::{churches, content, media, posts, users};
use super::state::AppState;

/// 全エンドポイントを持つルーターを構築する
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/search", get(users::search_users))
        .route("/users/friend-request", post(users::send_friend_request))
        .route("/users/{user_id}", get(users::get_user))
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{post_id}/react", post(posts::react_to_post))
        .route(
            "/churches",
            get(churches::list_churches).post(churches::create_church),
        )
        .route("/churches/{church_id}", get(churches::get_church))
        .route("/churches/{church_id}/follow", post(churches::follow_church))
        .route(
            "/churches/{church_id}/events",
            get(churches::list_church_events).post(churches::create_church_event),
        )
        .route("/media", get(media::list_media).post(media::create_media))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(content::liveness))
        .route("/signup-profile", post(users::signup_profile))
        .route("/bible/verse-of-the-day", get(content::verse_of_the_day))
        .route("/music/trending", get(content::trending_music))
        .merge(protected)
        // リクエストトレーシングレイヤー（method, path, status, latencyを自動記録）
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 初期化に失敗したプロセス用のルーターを構築する
///
/// `GET /`のみ応答し、それ以外は全て503を返す。
pub fn create_unready_router(reason: impl Into<String>) -> Router {
    let reason = reason.into();
    tracing::error!(reason = %reason, "初期化失敗のため未準備状態で起動");

    Router::new()
        .route("/", get(content::liveness))
        .fallback(|| async {
            ApiError::service_unavailable("Service is not ready").into_response()
        })
        .layer(TraceLayer::new_for_http())
}
