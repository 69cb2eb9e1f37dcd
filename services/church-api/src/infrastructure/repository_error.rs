/// リポジトリ共通のエラー型
use thiserror::Error;

/// リポジトリ操作のエラー型
///
/// ドキュメントの不在はエラーではなく各操作の戻り値（Option/結果enum）で表現する。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// ストアへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// ストアからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// データのシリアライズ/デシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        assert_eq!(
            RepositoryError::WriteError("throttled".to_string()).to_string(),
            "Write error: throttled"
        );
        assert_eq!(
            RepositoryError::ReadError("missing table".to_string()).to_string(),
            "Read error: missing table"
        );
        assert_eq!(
            RepositoryError::SerializationError("bad number".to_string()).to_string(),
            "Serialization error: bad number"
        );
    }

    #[test]
    fn test_repository_error_equality() {
        assert_eq!(
            RepositoryError::ReadError("a".to_string()),
            RepositoryError::ReadError("a".to_string())
        );
        assert_ne!(
            RepositoryError::ReadError("a".to_string()),
            RepositoryError::WriteError("a".to_string())
        );
    }
}
