use async_trait::async_trait;
use domain::{NewTodo, Todo, TodoId};
use thiserror::Error;

/// ストア実装が返すエラー
///
/// どの操作の失敗として扱うか（取得失敗か永続化失敗か）は呼び出し側が決める。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 接続断・スロットリング・条件違反などバックエンド起因の失敗
    #[error("{0}")]
    Backend(String),

    /// 取得したアイテムを Todo として解釈できない
    #[error("failed to decode item: {0}")]
    Decode(String),
}

/// Todo コレクションへのアクセス
///
/// 各操作は単一アイテム単位でアトミック。複数アイテムにまたがる保証はない。
/// 実装は axum の State に載せるため `Send + Sync + 'static` であること。
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// コレクションの全件を取得する。
    /// 1 件でも解釈できないアイテムがあれば `StoreError::Decode` で打ち切る。
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// 新しい識別子を払い出して挿入する。
    async fn insert(&self, new_todo: NewTodo) -> Result<Todo, StoreError>;

    /// `completed = true` を設定する。該当アイテムがあれば `true`。
    /// 該当しない場合もアイテムを作成してはならない。
    async fn mark_completed(&self, id: &TodoId) -> Result<bool, StoreError>;

    /// 削除する。該当アイテムがあれば `true`。
    async fn delete(&self, id: &TodoId) -> Result<bool, StoreError>;
}
