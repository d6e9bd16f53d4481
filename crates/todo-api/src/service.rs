use std::sync::Arc;

use domain::{NewTodo, Todo, TodoError, TodoId};
use infrastructure::TodoStore;
use tracing::{debug, info};

/// Todo の 4 操作（一覧・作成・完了・削除）とコレクションの対応付け
///
/// 状態はすべてストア側にあり、サービス自身は呼び出し間で何も保持しない。
/// 識別子や本文の検証はストアに触れる前に行う。
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// 全件を取得する。解釈できないアイテムが 1 件でもあれば全体を失敗させる。
    pub async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        self.store
            .find_all()
            .await
            .map_err(|e| TodoError::Retrieval(format!("Failed to fetch todos: {e}")))
    }

    pub async fn create(&self, new_todo: NewTodo) -> Result<Todo, TodoError> {
        new_todo.validate()?;

        let todo = self
            .store
            .insert(new_todo)
            .await
            .map_err(|e| TodoError::Persistence(format!("Failed to create todo: {e}")))?;

        info!(todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    /// 完了にする。該当する Todo がなくても成功扱い。
    pub async fn complete_by_id(&self, raw_id: &str) -> Result<(), TodoError> {
        let id = TodoId::parse(raw_id)?;

        let matched = self
            .store
            .mark_completed(&id)
            .await
            .map_err(|e| TodoError::Persistence(format!("Failed to update todo: {e}")))?;

        if matched {
            info!(todo_id = %id, "Todo completed");
        } else {
            debug!(todo_id = %id, "No todo matched; nothing to complete");
        }
        Ok(())
    }

    /// 削除する。該当する Todo がなくても成功扱い。
    pub async fn delete_by_id(&self, raw_id: &str) -> Result<(), TodoError> {
        let id = TodoId::parse(raw_id)?;

        let matched = self
            .store
            .delete(&id)
            .await
            .map_err(|e| TodoError::Persistence(format!("Failed to delete todo: {e}")))?;

        if matched {
            info!(todo_id = %id, "Todo deleted");
        } else {
            debug!(todo_id = %id, "No todo matched; nothing to delete");
        }
        Ok(())
    }
}
