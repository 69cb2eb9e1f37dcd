/// DynamoDBでメディアのメタデータを管理するためのリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo_item::{from_items, scan_items, to_item};
use super::repository_error::RepositoryError;
use crate::domain::Media;

/// メディア永続化用トレイト
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn create(&self, media: &Media) -> Result<(), RepositoryError>;

    /// 新しい順に最大`limit`件取得
    async fn list(&self, limit: usize) -> Result<Vec<Media>, RepositoryError>;
}

/// 新しい順に並べて`limit`件に切り詰める
pub fn newest_first(mut media: Vec<Media>, limit: usize) -> Vec<Media> {
    media.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    media.truncate(limit);
    media
}

/// MediaRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoMediaRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// メディアテーブル名（パーティションキー: id）
    table_name: String,
}

impl DynamoMediaRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl MediaRepository for DynamoMediaRepository {
    async fn create(&self, media: &Media) -> Result<(), RepositoryError> {
        let item = to_item(media)?;

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

    async fn list(&self, limit: usize) -> Result<Vec<Media>, RepositoryError> {
        // 並び替えのため全件スキャンしてから切り詰める
        let items = scan_items(&self.client, &self.table_name, None).await?;
        Ok(newest_first(from_items(items)?, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MediaDraft, MediaType};

    fn media(id: &str, created_at: &str) -> Media {
        Media::new(
            id.to_string(),
            "u1".to_string(),
            MediaDraft {
                title: id.to_string(),
                url: "https://example.com/a.mp4".to_string(),
                media_type: MediaType::Video,
                description: None,
            },
            created_at.to_string(),
        )
    }

    #[test]
    fn test_newest_first_sorts_and_truncates() {
        let list = vec![
            media("old", "2024-01-01T00:00:00.000Z"),
            media("new", "2024-03-01T00:00:00.000Z"),
            media("mid", "2024-02-01T00:00:00.000Z"),
        ];

        let ids: Vec<String> = newest_first(list, 2).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }
}
