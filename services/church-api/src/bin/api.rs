/// Lambda HTTPエントリーポイント
///
/// コールドスタート時にストアクライアント・リポジトリ・トークン検証器を一度だけ構築し、
/// axumルーターをlambda_http上で実行する。
/// 初期化に失敗した場合はリクエスト毎に失敗させず、未準備状態のルーター
/// （`GET /`以外は503）で起動する。
use church_api::http::{create_router, create_unready_router, AppState};
use church_api::infrastructure::init_logging;
use lambda_http::Error;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let router = match AppState::from_env().await {
        Ok(state) => {
            info!("Church API を起動します");
            create_router(state)
        }
        Err(e) => {
            error!(error = %e, "アプリケーション状態の初期化に失敗");
            create_unready_router(e.to_string())
        }
    };

    lambda_http::run(router).await
}
