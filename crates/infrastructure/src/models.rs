use aws_sdk_dynamodb::types::AttributeValue;
use domain::{Todo, TodoId};
use std::collections::HashMap;

use crate::store::StoreError;

pub const ATTR_PK: &str = "PK";
pub const ATTR_SK: &str = "SK";
pub const ATTR_ID: &str = "id";
pub const ATTR_BODY: &str = "body";
pub const ATTR_COMPLETED: &str = "completed";

/// ソートキーの接頭辞
pub const TODO_SK_PREFIX: &str = "TODO#";

/// DynamoDB Single Table Design のキー構造
///
/// コレクションはパーティションキー、Todo はソートキーで表す。
/// ULID はソートキー上で作成順に並ぶ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbKeys {
    pub pk: String,
    pub sk: String,
}

impl DynamoDbKeys {
    pub fn collection_pk(collection: &str) -> String {
        format!("COLLECTION#{collection}")
    }

    pub fn for_todo(collection: &str, todo_id: &TodoId) -> Self {
        Self {
            pk: Self::collection_pk(collection),
            sk: format!("{TODO_SK_PREFIX}{todo_id}"),
        }
    }

    pub fn to_key_map(&self) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (ATTR_PK.to_string(), AttributeValue::S(self.pk.clone())),
            (ATTR_SK.to_string(), AttributeValue::S(self.sk.clone())),
        ])
    }
}

/// Todo を DynamoDB アイテムに変換
pub fn todo_to_item(collection: &str, todo: &Todo) -> HashMap<String, AttributeValue> {
    let mut item = DynamoDbKeys::for_todo(collection, &todo.id).to_key_map();
    item.insert(ATTR_ID.to_string(), AttributeValue::S(todo.id.to_string()));
    item.insert(ATTR_BODY.to_string(), AttributeValue::S(todo.body.clone()));
    item.insert(
        ATTR_COMPLETED.to_string(),
        AttributeValue::Bool(todo.completed),
    );
    item
}

/// DynamoDB アイテムから Todo を復元
pub fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<Todo, StoreError> {
    let raw_id = string_attr(item, ATTR_ID)?;
    let id = TodoId::parse(raw_id)
        .map_err(|_| StoreError::Decode(format!("invalid `{ATTR_ID}` value {raw_id:?}")))?;

    let body = string_attr(item, ATTR_BODY)?.clone();

    let completed = *item
        .get(ATTR_COMPLETED)
        .ok_or_else(|| missing(ATTR_COMPLETED))?
        .as_bool()
        .map_err(|_| wrong_type(ATTR_COMPLETED, "BOOL"))?;

    Ok(Todo {
        id,
        body,
        completed,
    })
}

fn string_attr<'a>(
    item: &'a HashMap<String, AttributeValue>,
    name: &str,
) -> Result<&'a String, StoreError> {
    item.get(name)
        .ok_or_else(|| missing(name))?
        .as_s()
        .map_err(|_| wrong_type(name, "S"))
}

fn missing(name: &str) -> StoreError {
    StoreError::Decode(format!("missing attribute `{name}`"))
}

fn wrong_type(name: &str, expected: &str) -> StoreError {
    StoreError::Decode(format!("attribute `{name}` is not of type {expected}"))
}
