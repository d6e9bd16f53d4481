use async_trait::async_trait;
use domain::{NewTodo, Todo, TodoId};
use std::collections::BTreeMap;
use tokio::sync::{Mutex, RwLock};

use crate::store::{StoreError, TodoStore};

/// ストアに届いた呼び出し（テスト観測用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FindAll,
    Insert(NewTodo),
    MarkCompleted(TodoId),
    Delete(TodoId),
}

/// 簡易な InMemory 実装（開発/テスト用）
///
/// ULID をキーにした BTreeMap なので、一覧は DynamoDB と同じく作成順になる。
/// 呼び出し履歴は `recording()` で作ったときだけ保持する。
#[derive(Default)]
pub struct InMemoryTodoStore {
    todos: RwLock<BTreeMap<TodoId, Todo>>,
    calls: Option<Mutex<Vec<StoreCall>>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 呼び出し履歴を記録するストア（テスト観測用）
    pub fn recording() -> Self {
        Self {
            todos: RwLock::default(),
            calls: Some(Mutex::default()),
        }
    }

    /// これまでに受け付けた呼び出しの履歴。記録していなければ空。
    pub async fn calls(&self) -> Vec<StoreCall> {
        match &self.calls {
            Some(calls) => calls.lock().await.clone(),
            None => Vec::new(),
        }
    }

    async fn record(&self, call: StoreCall) {
        if let Some(calls) = &self.calls {
            calls.lock().await.push(call);
        }
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        self.record(StoreCall::FindAll).await;
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn insert(&self, new_todo: NewTodo) -> Result<Todo, StoreError> {
        if self.calls.is_some() {
            self.record(StoreCall::Insert(new_todo.clone())).await;
        }

        let mut todos = self.todos.write().await;
        let mut id = TodoId::new();
        while todos.contains_key(&id) {
            id = TodoId::new();
        }
        let todo = Todo::from_new(id, new_todo);
        todos.insert(id, todo.clone());
        Ok(todo)
    }

    async fn mark_completed(&self, id: &TodoId) -> Result<bool, StoreError> {
        self.record(StoreCall::MarkCompleted(*id)).await;

        match self.todos.write().await.get_mut(id) {
            Some(todo) => {
                todo.complete();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &TodoId) -> Result<bool, StoreError> {
        self.record(StoreCall::Delete(*id)).await;
        Ok(self.todos.write().await.remove(id).is_some())
    }
}
