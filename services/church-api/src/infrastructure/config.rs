/// DynamoDB接続設定
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// 設定読み込みのエラー型
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// ユーザーテーブル名の環境変数
pub const ENV_USERS_TABLE: &str = "USERS_TABLE";
/// 友達リクエストテーブル名の環境変数
pub const ENV_FRIEND_REQUESTS_TABLE: &str = "FRIEND_REQUESTS_TABLE";
/// 投稿テーブル名の環境変数
pub const ENV_POSTS_TABLE: &str = "POSTS_TABLE";
/// 教会テーブル名の環境変数
pub const ENV_CHURCHES_TABLE: &str = "CHURCHES_TABLE";
/// 教会イベントテーブル名の環境変数
pub const ENV_CHURCH_EVENTS_TABLE: &str = "CHURCH_EVENTS_TABLE";
/// メディアテーブル名の環境変数
pub const ENV_MEDIA_TABLE: &str = "MEDIA_TABLE";

/// コレクションごとのテーブル名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub users: String,
    pub friend_requests: String,
    pub posts: String,
    pub churches: String,
    pub church_events: String,
    pub media: String,
}

impl TableNames {
    /// 環境変数からテーブル名を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数からテーブル名を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        Ok(Self {
            users: require(ENV_USERS_TABLE)?,
            friend_requests: require(ENV_FRIEND_REQUESTS_TABLE)?,
            posts: require(ENV_POSTS_TABLE)?,
            churches: require(ENV_CHURCHES_TABLE)?,
            church_events: require(ENV_CHURCH_EVENTS_TABLE)?,
            media: require(ENV_MEDIA_TABLE)?,
        })
    }
}

/// テーブル名とクライアントを持つDynamoDB設定
#[derive(Debug, Clone)]
pub struct DynamoDbConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    tables: TableNames,
}

impl DynamoDbConfig {
    /// 環境からAWS設定を読み込み、環境変数からテーブル名を読み取って新しいDynamoDbConfigを作成
    ///
    /// AWS認証情報とリージョンはaws-configにより自動読み込みされる。
    pub async fn from_env() -> Result<Self, ConfigError> {
        // テーブル名が揃っていなければAWS設定の読み込み前に失敗させる
        let tables = TableNames::from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, tables })
    }

    /// 明示的な値で新しいDynamoDbConfigを作成
    pub fn new(client: DynamoDbClient, tables: TableNames) -> Self {
        Self { client, tables }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// テーブル名を取得
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    const ALL_VARS: [&str; 6] = [
        ENV_USERS_TABLE,
        ENV_FRIEND_REQUESTS_TABLE,
        ENV_POSTS_TABLE,
        ENV_CHURCHES_TABLE,
        ENV_CHURCH_EVENTS_TABLE,
        ENV_MEDIA_TABLE,
    ];

    fn full_env() -> HashMap<String, String> {
        ALL_VARS
            .iter()
            .map(|key| (key.to_string(), format!("{}-value", key.to_lowercase())))
            .collect()
    }

    #[test]
    fn test_missing_env_var_error_display() {
        let error = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(error.to_string(), "Missing environment variable: TEST_VAR");
    }

    #[test]
    fn test_from_lookup_reads_all_tables() {
        let env = full_env();
        let tables = TableNames::from_lookup(|key| env.get(key).cloned()).unwrap();

        assert_eq!(tables.users, "users_table-value");
        assert_eq!(tables.friend_requests, "friend_requests_table-value");
        assert_eq!(tables.posts, "posts_table-value");
        assert_eq!(tables.churches, "churches_table-value");
        assert_eq!(tables.church_events, "church_events_table-value");
        assert_eq!(tables.media, "media_table-value");
    }

    #[test]
    fn test_from_lookup_reports_each_missing_variable() {
        for missing in ALL_VARS {
            let mut env = full_env();
            env.remove(missing);

            let result = TableNames::from_lookup(|key| env.get(key).cloned());
            assert_eq!(result, Err(ConfigError::MissingEnvVar(missing.to_string())));
        }
    }

    #[test]
    fn test_from_lookup_treats_blank_as_missing() {
        let mut env = full_env();
        env.insert(ENV_POSTS_TABLE.to_string(), "  ".to_string());

        let result = TableNames::from_lookup(|key| env.get(key).cloned());
        assert_eq!(
            result,
            Err(ConfigError::MissingEnvVar(ENV_POSTS_TABLE.to_string()))
        );
    }

    // 環境変数はプロセスグローバルな状態なのでシリアル実行する
    #[test]
    #[serial]
    fn test_from_env() {
        // 安全性: serialによりこのテスト中は他の環境変数テストが走らない
        unsafe {
            for key in ALL_VARS {
                std::env::set_var(key, format!("env-{}", key));
            }
        }

        let tables = TableNames::from_env().unwrap();
        assert_eq!(tables.users, "env-USERS_TABLE");
        assert_eq!(tables.media, "env-MEDIA_TABLE");

        unsafe {
            std::env::remove_var(ENV_MEDIA_TABLE);
        }
        assert_eq!(
            TableNames::from_env(),
            Err(ConfigError::MissingEnvVar(ENV_MEDIA_TABLE.to_string()))
        );

        unsafe {
            for key in ALL_VARS {
                std::env::remove_var(key);
            }
        }
    }

    #[tokio::test]
    async fn test_dynamodb_config_new() {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);
        let env = full_env();
        let tables = TableNames::from_lookup(|key| env.get(key).cloned()).unwrap();

        let config = DynamoDbConfig::new(client, tables.clone());

        assert_eq!(config.tables(), &tables);
        let _client_ref = config.client();
    }
}
