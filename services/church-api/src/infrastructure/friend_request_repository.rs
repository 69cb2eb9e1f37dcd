/// DynamoDBで友達リクエストを管理するためのリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo_item::{from_item, to_item};
use super::repository_error::RepositoryError;
use crate::domain::FriendRequest;

/// 友達リクエスト永続化用トレイト
#[async_trait]
pub trait FriendRequestRepository: Send + Sync {
    /// リクエストを保存する
    ///
    /// IDは`senderId_recipientId`で決まるため、同じ組み合わせの再送は上書きになる。
    async fn put(&self, request: &FriendRequest) -> Result<(), RepositoryError>;

    /// IDでリクエストを取得
    async fn get(&self, id: &str) -> Result<Option<FriendRequest>, RepositoryError>;
}

/// FriendRequestRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoFriendRequestRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// 友達リクエストテーブル名（パーティションキー: id）
    table_name: String,
}

impl DynamoFriendRequestRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl FriendRequestRepository for DynamoFriendRequestRepository {
    async fn put(&self, request: &FriendRequest) -> Result<(), RepositoryError> {
        let item = to_item(request)?;

        // 条件なしのPutItem: 同一IDは丸ごと置き換わる
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<FriendRequest>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        match result.item {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }
}
