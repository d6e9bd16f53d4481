use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use domain::{NewTodo, Todo, TodoId};
use shared::Config;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::models::{item_to_todo, todo_to_item, DynamoDbKeys, ATTR_COMPLETED, TODO_SK_PREFIX};
use crate::store::{StoreError, TodoStore};

/// DynamoDB 上の Todo コレクション
#[derive(Clone)]
pub struct DynamoDbTodoStore {
    client: Client,
    table_name: String,
    collection: String,
}

impl DynamoDbTodoStore {
    /// 設定から AWS クライアントを構築する。
    /// `dynamodb_endpoint` があれば DynamoDB Local などに向ける。
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        Self::from_client(
            Client::new(&aws_config),
            &config.dynamodb_table,
            &config.collection,
        )
    }

    pub fn from_client(client: Client, table_name: &str, collection: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            collection: collection.to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// テーブルに到達できることを確認する（起動時の疎通確認）
    pub async fn verify_connection(&self) -> Result<(), StoreError> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(backend_error)?;

        info!(table = %self.table_name, "Connected to DynamoDB");
        Ok(())
    }
}

#[async_trait]
impl TodoStore for DynamoDbTodoStore {
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        let pk = DynamoDbKeys::collection_pk(&self.collection);
        let mut todos = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            // 直前の完了・削除を一覧に反映させるため、強い整合性で読む
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .consistent_read(true)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(pk.clone()))
                .expression_attribute_values(
                    ":sk_prefix",
                    AttributeValue::S(TODO_SK_PREFIX.to_string()),
                )
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(backend_error)?;

            for item in result.items() {
                todos.push(item_to_todo(item)?);
            }

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        debug!(count = todos.len(), "Fetched todos");
        Ok(todos)
    }

    async fn insert(&self, new_todo: NewTodo) -> Result<Todo, StoreError> {
        let todo = Todo::from_new(TodoId::new(), new_todo);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(todo_to_item(&self.collection, &todo)))
            .condition_expression("attribute_not_exists(SK)")
            .send()
            .await
            .map_err(backend_error)?;

        Ok(todo)
    }

    async fn mark_completed(&self, id: &TodoId) -> Result<bool, StoreError> {
        let keys = DynamoDbKeys::for_todo(&self.collection, id);

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(keys.to_key_map()))
            .update_expression("SET #completed = :completed")
            .condition_expression("attribute_exists(SK)")
            .expression_attribute_names("#completed", ATTR_COMPLETED)
            .expression_attribute_values(":completed", AttributeValue::Bool(true))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            // 条件不一致は「該当なし」。upsert しない。
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Ok(false)
            }
            Err(e) => Err(backend_error(e)),
        }
    }

    async fn delete(&self, id: &TodoId) -> Result<bool, StoreError> {
        let keys = DynamoDbKeys::for_todo(&self.collection, id);

        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(keys.to_key_map()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(backend_error)?;

        Ok(result.attributes().is_some_and(|attrs| !attrs.is_empty()))
    }
}

fn backend_error<E>(e: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Backend(DisplayErrorContext(e).to_string())
}
