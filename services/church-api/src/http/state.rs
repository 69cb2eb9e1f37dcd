//! アプリケーション状態
//!
//! ストアクライアント・リポジトリ・トークン検証器はコールドスタート時に一度だけ構築し、
//! `Arc`でルーター全体に共有する。

use std::sync::Arc;

use thiserror::Error;

use crate::application::MembershipService;
use crate::domain::StaticContent;
use crate::infrastructure::{
    load_static_content, AuthConfig, AuthError, ChurchRepository, ConfigError,
    DynamoChurchRepository, DynamoDbConfig, DynamoFriendRequestRepository, DynamoMediaRepository,
    DynamoPostRepository, DynamoUserRepository, FriendRequestRepository, InMemoryStore,
    JwksTokenVerifier, MediaRepository, PostRepository, StaticContentError, TokenVerifier,
    UserRepository,
};

/// 起動時初期化のエラー型
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Token verifier error: {0}")]
    Auth(#[from] AuthError),
    #[error("Static content error: {0}")]
    StaticContent(#[from] StaticContentError),
}

/// ルーター全体で共有される状態
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub friend_requests: Arc<dyn FriendRequestRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub churches: Arc<dyn ChurchRepository>,
    pub media: Arc<dyn MediaRepository>,
    pub membership: MembershipService,
    pub verifier: Arc<dyn TokenVerifier>,
    pub static_content: Arc<StaticContent>,
}

impl AppState {
    /// DynamoDBリポジトリで状態を構築
    pub fn with_dynamodb(
        config: &DynamoDbConfig,
        verifier: Arc<dyn TokenVerifier>,
        static_content: StaticContent,
    ) -> Self {
        let client = config.client().clone();
        let tables = config.tables();

        let churches: Arc<dyn ChurchRepository> = Arc::new(DynamoChurchRepository::new(
            client.clone(),
            tables.churches.clone(),
            tables.church_events.clone(),
        ));

        Self {
            users: Arc::new(DynamoUserRepository::new(
                client.clone(),
                tables.users.clone(),
            )),
            friend_requests: Arc::new(DynamoFriendRequestRepository::new(
                client.clone(),
                tables.friend_requests.clone(),
            )),
            posts: Arc::new(DynamoPostRepository::new(
                client.clone(),
                tables.posts.clone(),
            )),
            membership: MembershipService::new(churches.clone()),
            churches,
            media: Arc::new(DynamoMediaRepository::new(client, tables.media.clone())),
            verifier,
            static_content: Arc::new(static_content),
        }
    }

    /// メモリストアで状態を構築
    pub fn in_memory(
        store: InMemoryStore,
        verifier: Arc<dyn TokenVerifier>,
        static_content: StaticContent,
    ) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            friend_requests: store.clone(),
            posts: store.clone(),
            churches: store.clone(),
            media: store.clone(),
            membership: MembershipService::new(store),
            verifier,
            static_content: Arc::new(static_content),
        }
    }

    /// 環境変数から本番用の状態を構築
    ///
    /// テーブル名・認証設定・静的コンテンツのいずれかが欠けていればエラーを返す。
    pub async fn from_env() -> Result<Self, StartupError> {
        let auth_config = AuthConfig::from_env()?;
        let static_content = load_static_content()?;
        let dynamodb = DynamoDbConfig::from_env().await?;

        tracing::info!(
            issuer = %auth_config.issuer,
            users_table = %dynamodb.tables().users,
            churches_table = %dynamodb.tables().churches,
            "アプリケーション状態を初期化"
        );

        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwksTokenVerifier::new(auth_config)?);
        Ok(Self::with_dynamodb(&dynamodb, verifier, static_content))
    }
}
