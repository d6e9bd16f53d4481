use thiserror::Error;

/// Todo 操作の失敗分類
///
/// クライアント起因（4xx 相当）とストア起因（5xx 相当）に分かれる。
/// HTTP ステータスへの変換は API 層が行う。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    // クライアントエラー
    #[error("{0}")]
    Validation(String),

    #[error("Invalid ID")]
    InvalidId(String),

    // ストアエラー
    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Retrieval(String),
}

impl TodoError {
    /// 本文が空の場合のバリデーションエラー
    pub fn body_required() -> Self {
        TodoError::Validation("Body is required".to_string())
    }

    /// ストアに到達する前に検出されたエラーかどうか
    pub fn is_client_error(&self) -> bool {
        matches!(self, TodoError::Validation(_) | TodoError::InvalidId(_))
    }
}
