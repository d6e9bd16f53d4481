use crate::errors::TodoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// ストアが払い出す Todo の識別子（ULID）
///
/// 外部表現は 26 文字の Crockford Base32 文字列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Ulid);

impl TodoId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// 外部文字列表現を解析する。解析できなければ `TodoError::InvalidId`。
    pub fn parse(s: &str) -> Result<Self, TodoError> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| TodoError::InvalidId(s.to_string()))
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// 永続化済みの Todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub body: String,
    pub completed: bool,
}

impl Todo {
    /// ストアが払い出した識別子で新規 Todo を確定させる
    pub fn from_new(id: TodoId, new_todo: NewTodo) -> Self {
        Self {
            id,
            body: new_todo.body,
            completed: false,
        }
    }

    /// 完了にする。既に完了していても結果は同じ。
    pub fn complete(&mut self) {
        self.completed = true;
    }
}

/// 作成前の Todo（識別子なし）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub body: String,
}

impl NewTodo {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn validate(&self) -> Result<(), TodoError> {
        if self.body.is_empty() {
            return Err(TodoError::body_required());
        }
        Ok(())
    }
}
