/// 入力値バリデーションの共通部品
///
/// 各リクエストボディの検証は全フィールドを走査し、
/// フィールド単位のエラーメッセージをまとめて返す。
use serde::Serialize;
use thiserror::Error;

/// フィールド単位のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// 対象フィールド名（JSON上の名前）
    pub field: String,
    /// 利用者向けメッセージ
    pub message: String,
}

/// バリデーションエラーの集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed: {} field error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 単一フィールドのエラーから作成
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// 必須文字列フィールドを検証する
    ///
    /// 前後の空白を除去した結果が空であればエラーを記録し、`None`を返す。
    pub fn require_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.push(field, format!("{} is required", field));
                None
            }
        }
    }
}

/// 任意文字列フィールドを正規化する（空白のみは未指定扱い）
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// http(s)スキームのURLかどうか
pub fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims_value() {
        let mut errors = ValidationErrors::new();
        let value = errors.require_text("name", Some("  Grace  ".to_string()));

        assert_eq!(value, Some("Grace".to_string()));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_require_text_rejects_missing_and_blank() {
        let mut errors = ValidationErrors::new();
        assert!(errors.require_text("name", None).is_none());
        assert!(errors.require_text("title", Some("   ".to_string())).is_none());

        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "title"]);
        assert_eq!(errors.errors()[0].message, "name is required");
    }

    #[test]
    fn test_display_counts_errors() {
        let mut errors = ValidationErrors::new();
        errors.push("a", "x");
        errors.push("b", "y");
        assert_eq!(errors.to_string(), "validation failed: 2 field error(s)");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" ".to_string())), None);
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://cdn.example.com/a.mp4"));
        assert!(is_http_url("http://example.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://example.com/file"));
        assert!(!is_http_url("example.com"));
    }
}
