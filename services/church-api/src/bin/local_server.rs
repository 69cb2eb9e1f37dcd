/// ローカル開発用HTTPサーバー
///
/// Lambdaと同じルーターをaxum::serveで起動する。
/// ストアはメモリ上のドキュメントストアか、環境変数で指定したDynamoDBテーブルを選べる。
///
/// # 使用例
/// ```bash
/// cargo run --bin local_server -- --store memory --dev-auth
/// curl -H 'Authorization: Bearer alice' http://127.0.0.1:3000/churches
/// ```
use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::signal;

use church_api::http::{create_router, AppState, StartupError};
use church_api::infrastructure::{
    init_local_logging, load_static_content, AuthConfig, DevTokenVerifier, DynamoDbConfig,
    InMemoryStore, JwksTokenVerifier, TokenVerifier,
};

/// ストアの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// プロセス内のメモリストア（再起動で消える）
    Memory,
    /// 環境変数で指定したDynamoDBテーブル
    Dynamodb,
}

/// コマンドライン引数
#[derive(Debug, Parser)]
#[command(name = "local_server", about = "Church API のローカル開発サーバー")]
struct Args {
    /// バインドするホスト
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// バインドするポート
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// 使用するストア
    #[arg(long, value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,

    /// トークン文字列をそのまま利用者IDとして受け入れる（JWKS検証を行わない）
    #[arg(long)]
    dev_auth: bool,
}

/// 引数に従って状態を構築
async fn build_state(args: &Args) -> Result<AppState, StartupError> {
    let verifier: Arc<dyn TokenVerifier> = if args.dev_auth {
        tracing::warn!("開発用認証が有効: トークンを検証しません");
        Arc::new(DevTokenVerifier)
    } else {
        Arc::new(JwksTokenVerifier::new(AuthConfig::from_env()?)?)
    };
    let static_content = load_static_content()?;

    Ok(match args.store {
        StoreKind::Memory => AppState::in_memory(InMemoryStore::new(), verifier, static_content),
        StoreKind::Dynamodb => {
            let config = DynamoDbConfig::from_env().await?;
            AppState::with_dynamodb(&config, verifier, static_content)
        }
    })
}

/// シャットダウンシグナルを待機する
///
/// SIGTERMまたはCtrl+C (SIGINT) を待機し、いずれかを受信したらリターンする。
///
/// # Panics
/// シグナルハンドラーの登録に失敗した場合はパニックする。
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Ctrl+C シグナルハンドラーの登録に失敗しました");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM シグナルハンドラーの登録に失敗しました")
            .recv()
            .await;
    };

    // Windows等の非Unix環境ではSIGTERMは利用不可
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C (SIGINT) を受信しました。graceful shutdownを開始します");
        }
        _ = terminate => {
            tracing::info!("SIGTERM を受信しました。graceful shutdownを開始します");
        }
    }
}

#[tokio::main]
async fn main() {
    init_local_logging();
    let args = Args::parse();

    let state = build_state(&args)
        .await
        .unwrap_or_else(|e| panic!("起動に失敗しました: {}", e));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .expect("ホストとポートからアドレスを組み立てられません");
    tracing::info!(store = ?args.store, "リッスン開始: {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("アドレスのバインドに失敗しました");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("サーバーの起動に失敗しました");

    tracing::info!("サーバーが正常に停止しました");
}
