/// DynamoDBで投稿とリアクション数を管理するためのリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo_item::{from_items, to_item, Item};
use super::repository_error::RepositoryError;
use crate::domain::Post;

/// フィード用GSIの名前（パーティションキー: feedKey, ソートキー: createdAt）
pub const FEED_INDEX_NAME: &str = "feed-index";

/// 全投稿に共通のfeedKey値
pub const FEED_KEY: &str = "POST";

/// リアクション加算の更新式
///
/// ADDはトップレベル属性にしか使えないため、ネストしたマップのキーはSET + if_not_existsで加算する。
/// reactionsマップは投稿作成時に空マップで作られている前提。
pub const INCREMENT_REACTION_UPDATE_EXPRESSION: &str =
    "SET reactions.#reaction = if_not_exists(reactions.#reaction, :zero) + :one";

/// リアクション加算の条件式（投稿が存在する場合のみ）
pub const INCREMENT_REACTION_CONDITION_EXPRESSION: &str = "attribute_exists(id)";

/// リアクション加算の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionResult {
    /// 加算した（加算後の件数）
    Incremented { count: u64 },
    /// 投稿が存在しない
    PostNotFound,
}

/// 投稿永続化用トレイト
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// 新しい投稿を保存
    async fn create(&self, post: &Post) -> Result<(), RepositoryError>;

    /// 新しい順に最大`limit`件取得
    async fn list_latest(&self, limit: usize) -> Result<Vec<Post>, RepositoryError>;

    /// 指定リアクションの件数を原子的に1増やす
    ///
    /// 並行して呼ばれても加算が失われることはない。
    async fn increment_reaction(
        &self,
        post_id: &str,
        reaction: &str,
    ) -> Result<ReactionResult, RepositoryError>;
}

/// PostRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoPostRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// 投稿テーブル名
    table_name: String,
}

impl DynamoPostRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// 投稿をフィードGSI用の属性付きアイテムに変換
    fn build_post_item(post: &Post) -> Result<Item, RepositoryError> {
        let mut item = to_item(post)?;
        item.insert("feedKey".to_string(), AttributeValue::S(FEED_KEY.to_string()));
        Ok(item)
    }

    /// UpdateItemの戻り値（UPDATED_NEW）から加算後の件数を取得
    ///
    /// 形式: `{"reactions": {"M": {<reaction>: {"N": "<count>"}}}}`
    fn reaction_count_from(attributes: Option<&Item>, reaction: &str) -> Option<u64> {
        attributes
            .and_then(|item| item.get("reactions"))
            .and_then(|v| v.as_m().ok())
            .and_then(|m| m.get(reaction))
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<u64>().ok())
    }
}

#[async_trait]
impl PostRepository for DynamoPostRepository {
    async fn create(&self, post: &Post) -> Result<(), RepositoryError> {
        let item = Self::build_post_item(post)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn list_latest(&self, limit: usize) -> Result<Vec<Post>, RepositoryError> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(FEED_INDEX_NAME)
            .key_condition_expression("feedKey = :feed")
            .expression_attribute_values(":feed", AttributeValue::S(FEED_KEY.to_string()))
            .scan_index_forward(false)
            .limit(limit)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        from_items(result.items.unwrap_or_default())
    }

    async fn increment_reaction(
        &self,
        post_id: &str,
        reaction: &str,
    ) -> Result<ReactionResult, RepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(post_id.to_string()))
            .update_expression(INCREMENT_REACTION_UPDATE_EXPRESSION)
            .condition_expression(INCREMENT_REACTION_CONDITION_EXPRESSION)
            .expression_attribute_names("#reaction", reaction)
            .expression_attribute_values(":zero", AttributeValue::N("0".to_string()))
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await;

        match result {
            Ok(output) => {
                let count = Self::reaction_count_from(output.attributes.as_ref(), reaction)
                    .ok_or_else(|| {
                        RepositoryError::SerializationError("Missing reaction count".to_string())
                    })?;
                Ok(ReactionResult::Incremented { count })
            }
            Err(err) => match err.into_service_error() {
                UpdateItemError::ConditionalCheckFailedException(_) => {
                    Ok(ReactionResult::PostNotFound)
                }
                other => Err(RepositoryError::WriteError(other.to_string())),
            },
        }
    }
}
