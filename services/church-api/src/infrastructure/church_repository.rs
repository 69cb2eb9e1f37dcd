/// DynamoDBで教会とその配下のイベントを管理するためのリポジトリ
///
/// メンバー追加はフォロワー数の加算と同一の条件付きUpdateItemで行い、
/// `followerCount == members.len()`の不変条件をストア側で原子的に保つ。
use async_trait::async_trait;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue, ReturnValuesOnConditionCheckFailure};
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo_item::{from_item, from_items, number_attribute, scan_items, to_item, Item};
use super::repository_error::RepositoryError;
use crate::domain::{Church, ChurchEvent};

/// メンバー追加の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMemberResult {
    /// 追加した（追加後のフォロワー数）
    Added { follower_count: u64 },
    /// 既にメンバーだった
    AlreadyMember,
    /// 教会が存在しない
    ChurchNotFound,
}

/// 教会ドキュメント永続化用トレイト
#[async_trait]
pub trait ChurchRepository: Send + Sync {
    /// 新しい教会を保存（同一IDが既に存在する場合はエラー）
    async fn create(&self, church: &Church) -> Result<(), RepositoryError>;

    /// 教会を最大`limit`件取得
    async fn list(&self, limit: usize) -> Result<Vec<Church>, RepositoryError>;

    /// IDで教会を取得
    async fn get(&self, church_id: &str) -> Result<Option<Church>, RepositoryError>;

    /// メンバーを追加しフォロワー数を1増やす
    ///
    /// # 戻り値
    /// * 追加した場合は`Ok(AddMemberResult::Added)`
    /// * 既にメンバーの場合は`Ok(AddMemberResult::AlreadyMember)`（何も変更しない）
    /// * 教会が無い場合は`Ok(AddMemberResult::ChurchNotFound)`（ドキュメントは作らない）
    /// * ストア障害時は`Err(RepositoryError)`（部分的な変更は残らない）
    async fn add_member(
        &self,
        church_id: &str,
        member_id: &str,
    ) -> Result<AddMemberResult, RepositoryError>;

    /// 教会配下にイベントを保存
    async fn create_event(&self, event: &ChurchEvent) -> Result<(), RepositoryError>;

    /// 教会配下のイベントを作成日時の昇順で取得
    async fn list_events(&self, church_id: &str) -> Result<Vec<ChurchEvent>, RepositoryError>;
}

/// メンバー追加のUpdateExpression
///
/// members への追記と followerCount の加算を1回の書き込みで行う。
const ADD_MEMBER_UPDATE_EXPRESSION: &str =
    "SET members = list_append(members, :new_member) ADD followerCount :one";

/// メンバー追加の条件式（教会が存在し、かつ未参加であること）
const ADD_MEMBER_CONDITION_EXPRESSION: &str =
    "attribute_exists(id) AND NOT contains(members, :member_id)";

/// ChurchRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoChurchRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// 教会テーブル名
    table_name: String,
    /// イベントテーブル名（パーティションキー: churchId, ソートキー: id）
    events_table_name: String,
}

impl DynamoChurchRepository {
    pub fn new(client: DynamoDbClient, table_name: String, events_table_name: String) -> Self {
        Self {
            client,
            table_name,
            events_table_name,
        }
    }

    /// 条件チェック失敗時の旧アイテムから結果を判定
    ///
    /// 旧アイテムが無ければ教会が存在しない。あれば並行したjoinが先に同じメンバーを追加した。
    fn classify_condition_failure(old_item: Option<&Item>) -> AddMemberResult {
        match old_item {
            Some(item) if !item.is_empty() => AddMemberResult::AlreadyMember,
            _ => AddMemberResult::ChurchNotFound,
        }
    }

    /// UpdateItemの戻り値（UPDATED_NEW）から加算後のフォロワー数を取得
    fn follower_count_from(attributes: Option<&Item>) -> Result<u64, RepositoryError> {
        attributes
            .and_then(|item| number_attribute(item, "followerCount"))
            .ok_or_else(|| {
                RepositoryError::SerializationError("Missing followerCount field".to_string())
            })
    }
}

#[async_trait]
impl ChurchRepository for DynamoChurchRepository {
    async fn create(&self, church: &Church) -> Result<(), RepositoryError> {
        let item = to_item(church)?;

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

    async fn list(&self, limit: usize) -> Result<Vec<Church>, RepositoryError> {
        let items = scan_items(&self.client, &self.table_name, Some(limit)).await?;
        from_items(items)
    }

    async fn get(&self, church_id: &str) -> Result<Option<Church>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(church_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        match result.item {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn add_member(
        &self,
        church_id: &str,
        member_id: &str,
    ) -> Result<AddMemberResult, RepositoryError> {
        // 強整合性読み込みで大半のケースを書き込みなしで判定
        let church = match self.get(church_id).await? {
            Some(church) => church,
            None => return Ok(AddMemberResult::ChurchNotFound),
        };
        if church.is_member(member_id) {
            return Ok(AddMemberResult::AlreadyMember);
        }

        // 読み込み後に他のリクエストが割り込んでも、条件式が重複追加を防ぐ
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(church_id.to_string()))
            .update_expression(ADD_MEMBER_UPDATE_EXPRESSION)
            .condition_expression(ADD_MEMBER_CONDITION_EXPRESSION)
            .expression_attribute_values(
                ":new_member",
                AttributeValue::L(vec![AttributeValue::S(member_id.to_string())]),
            )
            .expression_attribute_values(":member_id", AttributeValue::S(member_id.to_string()))
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await;

        match result {
            Ok(output) => {
                let follower_count = Self::follower_count_from(output.attributes.as_ref())?;
                Ok(AddMemberResult::Added { follower_count })
            }
            Err(err) => match err.into_service_error() {
                UpdateItemError::ConditionalCheckFailedException(e) => {
                    Ok(Self::classify_condition_failure(e.item()))
                }
                other => Err(RepositoryError::WriteError(other.to_string())),
            },
        }
    }

    async fn create_event(&self, event: &ChurchEvent) -> Result<(), RepositoryError> {
        let item = to_item(event)?;

        self.client
            .put_item()
            .table_name(&self.events_table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        Ok(())
    }

    async fn list_events(&self, church_id: &str) -> Result<Vec<ChurchEvent>, RepositoryError> {
        let mut items: Vec<Item> = Vec::new();
        let mut exclusive_start_key: Option<Item> = None;

        loop {
            let response = self
                .client
                .query()
                .table_name(&self.events_table_name)
                .key_condition_expression("churchId = :cid")
                .expression_attribute_values(":cid", AttributeValue::S(church_id.to_string()))
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

            items.extend(response.items.unwrap_or_default());

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        let mut events: Vec<ChurchEvent> = from_items(items)?;
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_condition_failure_without_item_is_not_found() {
        assert_eq!(
            DynamoChurchRepository::classify_condition_failure(None),
            AddMemberResult::ChurchNotFound
        );
        assert_eq!(
            DynamoChurchRepository::classify_condition_failure(Some(&Item::new())),
            AddMemberResult::ChurchNotFound
        );
    }

    #[test]
    fn test_classify_condition_failure_with_item_is_already_member() {
        let mut item = Item::new();
        item.insert("id".to_string(), AttributeValue::S("c1".to_string()));

        assert_eq!(
            DynamoChurchRepository::classify_condition_failure(Some(&item)),
            AddMemberResult::AlreadyMember
        );
    }

    #[test]
    fn test_follower_count_from_updated_attributes() {
        let mut item = Item::new();
        item.insert("followerCount".to_string(), AttributeValue::N("7".to_string()));

        assert_eq!(
            DynamoChurchRepository::follower_count_from(Some(&item)),
            Ok(7)
        );
        assert!(matches!(
            DynamoChurchRepository::follower_count_from(None),
            Err(RepositoryError::SerializationError(_))
        ));
    }

    #[test]
    fn test_add_member_expressions_update_both_fields_together() {
        // membersへの追記とfollowerCountの加算が同一式に含まれること
        assert!(ADD_MEMBER_UPDATE_EXPRESSION.contains("list_append(members, :new_member)"));
        assert!(ADD_MEMBER_UPDATE_EXPRESSION.contains("ADD followerCount :one"));
        assert!(ADD_MEMBER_CONDITION_EXPRESSION.contains("attribute_exists(id)"));
        assert!(ADD_MEMBER_CONDITION_EXPRESSION.contains("NOT contains(members, :member_id)"));
    }
}
