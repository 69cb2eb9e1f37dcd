/// DynamoDBでユーザープロフィールを管理するためのリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo_item::{from_item, Item};
use super::repository_error::RepositoryError;
use crate::domain::{normalize_search_name, ProfileUpdate, UserProfile};

/// 名前検索の最大件数
pub const USER_SEARCH_LIMIT: usize = 10;

/// ユーザープロフィール永続化用トレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// プロフィールを作成、または既存ドキュメントにマージする
    ///
    /// createdAtは初回のみ設定し、updatedAtは常に`now`で更新する。
    async fn save_profile(
        &self,
        update: &ProfileUpdate,
        now: &str,
    ) -> Result<UserProfile, RepositoryError>;

    /// 利用者IDでプロフィールを取得
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError>;

    /// 名前の前方一致（大文字小文字を区別しない）で検索し、名前順に最大`limit`件返す
    async fn search_by_name_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<UserProfile>, RepositoryError>;
}

/// UserRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoUserRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// ユーザーテーブル名（パーティションキー: userId）
    table_name: String,
}

/// マージ更新用のUpdateExpressionと属性値
#[derive(Debug, Clone, PartialEq)]
struct MergeExpression {
    expression: String,
    names: Vec<(String, String)>,
    values: Vec<(String, AttributeValue)>,
}

impl DynamoUserRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// マージ更新用のUpdateExpressionを組み立てる
    ///
    /// 属性名は予約語との衝突を避けるため全てプレースホルダー経由で指定する。
    /// 任意フィールドは値がある場合のみSETする（既存値を消さない）。
    fn build_merge_expression(update: &ProfileUpdate, now: &str) -> MergeExpression {
        let mut fields: Vec<(&str, AttributeValue)> = vec![
            ("name", AttributeValue::S(update.name.clone())),
            ("email", AttributeValue::S(update.email.clone())),
            ("phone", AttributeValue::S(update.phone.clone())),
            ("age", AttributeValue::N(update.age.to_string())),
            ("country", AttributeValue::S(update.country.clone())),
            ("searchName", AttributeValue::S(update.search_name())),
            ("updatedAt", AttributeValue::S(now.to_string())),
        ];
        if let Some(bio) = &update.bio {
            fields.push(("bio", AttributeValue::S(bio.clone())));
        }
        if let Some(url) = &update.profile_image_url {
            fields.push(("profileImageUrl", AttributeValue::S(url.clone())));
        }

        let mut assignments = Vec::new();
        let mut names = Vec::new();
        let mut values = Vec::new();

        for (i, (field, value)) in fields.into_iter().enumerate() {
            assignments.push(format!("#f{i} = :v{i}"));
            names.push((format!("#f{i}"), field.to_string()));
            values.push((format!(":v{i}"), value));
        }

        // createdAtは初回書き込み時のみ
        assignments.push("#created_at = if_not_exists(#created_at, :now)".to_string());
        names.push(("#created_at".to_string(), "createdAt".to_string()));
        values.push((":now".to_string(), AttributeValue::S(now.to_string())));

        MergeExpression {
            expression: format!("SET {}", assignments.join(", ")),
            names,
            values,
        }
    }
}

#[async_trait]
impl UserRepository for DynamoUserRepository {
    async fn save_profile(
        &self,
        update: &ProfileUpdate,
        now: &str,
    ) -> Result<UserProfile, RepositoryError> {
        let merge = Self::build_merge_expression(update, now);

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(update.user_id.clone()))
            .update_expression(merge.expression)
            .set_expression_attribute_names(Some(merge.names.into_iter().collect()))
            .set_expression_attribute_values(Some(merge.values.into_iter().collect()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        let item = result.attributes.ok_or_else(|| {
            RepositoryError::SerializationError("UpdateItem returned no attributes".to_string())
        })?;
        from_item(item)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        match result.item {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn search_by_name_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<UserProfile>, RepositoryError> {
        let prefix = normalize_search_name(prefix);
        let mut profiles: Vec<UserProfile> = Vec::new();
        let mut exclusive_start_key: Option<Item> = None;

        // Scanのlimitはフィルター適用前の件数なので、必要件数が揃うまでページを進める
        loop {
            let response = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("begins_with(searchName, :prefix)")
                .expression_attribute_values(":prefix", AttributeValue::S(prefix.clone()))
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

            for item in response.items.unwrap_or_default() {
                profiles.push(from_item(item)?);
            }

            if profiles.len() >= limit {
                break;
            }
            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        profiles.sort_by(|a, b| a.search_name.cmp(&b.search_name));
        profiles.truncate(limit);
        Ok(profiles)
    }
}
