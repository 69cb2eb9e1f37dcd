/// DynamoDBアイテムとドメイン構造体の相互変換ヘルパー
///
/// ドメイン構造体のserde表現（camelCase）をそのままDynamoDBの属性名として使う。
use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::repository_error::RepositoryError;

/// DynamoDBアイテム
pub type Item = HashMap<String, AttributeValue>;

/// 構造体をDynamoDBアイテムに変換
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, RepositoryError> {
    serde_dynamo::to_item(value).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// DynamoDBアイテムを構造体に変換
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, RepositoryError> {
    serde_dynamo::from_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// 複数アイテムをまとめて変換（1件でも失敗したらエラー）
pub fn from_items<T: DeserializeOwned>(items: Vec<Item>) -> Result<Vec<T>, RepositoryError> {
    items.into_iter().map(from_item).collect()
}

/// 数値属性をu64として読み取る
pub fn number_attribute(item: &Item, name: &str) -> Option<u64> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<u64>().ok())
}

/// テーブルをスキャンしてアイテムを取得する
///
/// `max_items`に達するか、最後のページまで読み切ったら終了する。
pub async fn scan_items(
    client: &DynamoDbClient,
    table_name: &str,
    max_items: Option<usize>,
) -> Result<Vec<Item>, RepositoryError> {
    let mut items: Vec<Item> = Vec::new();
    let mut exclusive_start_key: Option<Item> = None;

    loop {
        let response = client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(exclusive_start_key.take())
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        items.extend(response.items.unwrap_or_default());

        if let Some(max) = max_items {
            if items.len() >= max {
                items.truncate(max);
                break;
            }
        }

        match response.last_evaluated_key {
            Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
            _ => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Church, ChurchDraft};

    fn church() -> Church {
        Church::founded(
            "c1".to_string(),
            "owner".to_string(),
            ChurchDraft {
                name: "Grace".to_string(),
                description: "desc".to_string(),
                location: None,
            },
            "2024-01-01T00:00:00.000Z".to_string(),
        )
    }

    #[test]
    fn test_to_item_uses_camel_case_attributes() {
        let item = to_item(&church()).unwrap();

        assert_eq!(item.get("id"), Some(&AttributeValue::S("c1".to_string())));
        assert_eq!(item.get("ownerId"), Some(&AttributeValue::S("owner".to_string())));
        assert_eq!(item.get("followerCount"), Some(&AttributeValue::N("1".to_string())));
        assert_eq!(
            item.get("members"),
            Some(&AttributeValue::L(vec![AttributeValue::S("owner".to_string())]))
        );
        assert!(!item.contains_key("location"));
    }

    #[test]
    fn test_item_roundtrip() {
        let original = church();
        let restored: Church = from_item(to_item(&original).unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_from_item_reports_missing_fields() {
        let mut item = Item::new();
        item.insert("id".to_string(), AttributeValue::S("c1".to_string()));

        let result: Result<Church, _> = from_item(item);
        assert!(matches!(result, Err(RepositoryError::SerializationError(_))));
    }

    #[test]
    fn test_number_attribute() {
        let mut item = Item::new();
        item.insert("followerCount".to_string(), AttributeValue::N("42".to_string()));
        item.insert("name".to_string(), AttributeValue::S("x".to_string()));

        assert_eq!(number_attribute(&item, "followerCount"), Some(42));
        assert_eq!(number_attribute(&item, "name"), None);
        assert_eq!(number_attribute(&item, "missing"), None);
    }
}
