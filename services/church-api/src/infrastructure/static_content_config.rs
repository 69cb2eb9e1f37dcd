// 静的コンテンツ設定
//
// 聖句とトレンド楽曲のリストを読み込む。
// STATIC_CONTENT_PATHが設定されていればそのJSONファイルを、無ければ同梱のデフォルトを使う。

use thiserror::Error;

use crate::domain::StaticContent;

/// 静的コンテンツファイルパスの環境変数
pub const ENV_STATIC_CONTENT_PATH: &str = "STATIC_CONTENT_PATH";

/// 同梱のデフォルトコンテンツ
const DEFAULT_STATIC_CONTENT: &str = include_str!("../../content/static_content.json");

/// 静的コンテンツ読み込みのエラー型
#[derive(Debug, Error)]
pub enum StaticContentError {
    #[error("Failed to read static content file {path}: {message}")]
    Read { path: String, message: String },
    #[error("Invalid static content JSON: {0}")]
    Parse(String),
}

/// JSON文字列から静的コンテンツを読み込む
pub fn parse_static_content(json: &str) -> Result<StaticContent, StaticContentError> {
    serde_json::from_str(json).map_err(|e| StaticContentError::Parse(e.to_string()))
}

/// 同梱のデフォルトコンテンツを返す
pub fn default_static_content() -> Result<StaticContent, StaticContentError> {
    parse_static_content(DEFAULT_STATIC_CONTENT)
}

/// 環境変数の指定に従って静的コンテンツを読み込む
pub fn load_static_content() -> Result<StaticContent, StaticContentError> {
    match std::env::var(ENV_STATIC_CONTENT_PATH)
        .ok()
        .filter(|p| !p.trim().is_empty())
    {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| StaticContentError::Read {
                path: path.clone(),
                message: e.to_string(),
            })?;
            tracing::info!(path = %path, "静的コンテンツを読み込み");
            parse_static_content(&json)
        }
        None => default_static_content(),
    }
}
