use anyhow::{anyhow, bail, Result};
use aws_sdk_dynamodb::{
    operation::{
        create_table::CreateTableOutput, describe_table::DescribeTableOutput, scan::ScanOutput,
    },
    types::{
        AttributeDefinition, AttributeValue, BatchStatementRequest, BillingMode,
        KeySchemaElement, KeyType, PutRequest, TableStatus, WriteRequest,
    },
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::dynamodb::{Item, Table};
use crate::error::service_error;
use crate::utils::{poll_until, PollState};

/// BatchWriteItem and BatchExecuteStatement accept at most this many requests.
pub const MAX_BATCH_SIZE: usize = 25;

type AttributeMap = HashMap<String, AttributeValue>;

/// DynamoDB client wrapper for the table, item, query and PartiQL samples.
///
/// # DynamoDB Concepts
///
/// A table is a collection of items, and each item is a collection of
/// attributes. Only the primary key is declared up front: either a
/// partition key alone or a partition key plus a sort key.
///
/// - **Put / Get / Update / Delete** address a single item by its full key
/// - **Query** reads the items sharing a partition key, optionally narrowed
///   by a sort key condition
/// - **Scan** reads every item, filtering after the read
/// - **PartiQL** statements (`SELECT`, `INSERT`, `UPDATE`, `DELETE`) run
///   through `ExecuteStatement` with `?` positional parameters
///
/// # Example
///
/// ```no_run
/// use aws_sdk_samples::dynamodb::{DynamoDb, Item, Table};
///
/// # async fn demo() -> anyhow::Result<()> {
/// let config = aws_config::load_from_env().await;
/// let ddb = DynamoDb::new(&config);
///
/// let table = Table::new("users", "user_id", None);
/// ddb.create_table_if_not_exists(&table).await?;
/// ddb.wait_for_table_active(table.name()).await?;
///
/// let item = Item::new()
///     .set_string("user_id", "123")
///     .set_string("email", "user@example.com");
/// ddb.put_item("users", item).await?;
/// # Ok(())
/// # }
/// ```
///
/// Every method returns `anyhow::Result`; service failures carry the
/// operation name, error code, and message (see [`crate::error::service_error`]).
#[derive(Debug, Clone)]
pub struct DynamoDb {
    client: Client,
}

impl DynamoDb {
    /// Creates a new `DynamoDb` instance.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Verifies authentication by attempting to list tables.
    pub async fn check_auth(&self) -> Result<()> {
        self.client
            .list_tables()
            .limit(1)
            .send()
            .await
            .map_err(|e| {
                error!("Authentication failed: {}", e);
                anyhow!("Authentication failed")
            })?;
        info!("Authentication successful");
        Ok(())
    }

    // --- Table Operations ---

    /// Lists every table name in the account and region.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        self.client
            .list_tables()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error("ListTables", e))
    }

    /// Creates a table if it doesn't exist.
    pub async fn create_table_if_not_exists(
        &self,
        table: &Table<'_>,
    ) -> Result<Option<CreateTableOutput>> {
        if self.table_exists(table.name()).await? {
            info!("Table '{}' exists", table.name());
            return Ok(None);
        }

        let mut attribute_definitions = Vec::new();
        let mut key_schema = Vec::new();
        for (i, key) in table.key_attributes().into_iter().enumerate() {
            attribute_definitions.push(
                AttributeDefinition::builder()
                    .attribute_name(key.name)
                    .attribute_type(key.field_type.into())
                    .build()?,
            );
            key_schema.push(
                KeySchemaElement::builder()
                    .attribute_name(key.name)
                    .key_type(if i == 0 { KeyType::Hash } else { KeyType::Range })
                    .build()?,
            );
        }

        let output = self
            .client
            .create_table()
            .table_name(table.name())
            .billing_mode(BillingMode::PayPerRequest)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .send()
            .await
            .map_err(|e| service_error("CreateTable", e))?;
        info!("Table '{}' is being created", table.name());
        Ok(Some(output))
    }

    /// Polls the table description until the table is `ACTIVE`.
    pub async fn wait_for_table_active(&self, table_name: &str) -> Result<()> {
        poll_until(
            &format!("table '{table_name}'"),
            || async move {
                let output = match self.client.describe_table().table_name(table_name).send().await
                {
                    Ok(output) => output,
                    Err(e)
                        if e.as_service_error()
                            .is_some_and(|se| se.is_resource_not_found_exception()) =>
                    {
                        return Ok(PollState::Pending("NOT_FOUND".to_string()));
                    }
                    Err(e) => return Err(service_error("DescribeTable", e)),
                };
                let status = output.table().and_then(|t| t.table_status()).cloned();
                Ok(table_poll_state(status))
            },
            Duration::from_secs(2),
            60,
        )
        .await
    }

    /// Deletes a table.
    pub async fn delete_table(&self, table_name: &str) -> Result<()> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| service_error("DeleteTable", e))?;
        info!("Table '{table_name}' deleted");
        Ok(())
    }

    /// Checks if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        match self.client.describe_table().table_name(table_name).send().await {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                Ok(false)
            }
            Err(e) => Err(service_error("DescribeTable", e)),
        }
    }

    /// Retrieves table description.
    pub async fn describe_table(&self, table_name: &str) -> Result<DescribeTableOutput> {
        self.client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| service_error("DescribeTable", e))
    }

    // --- Item Operations ---

    /// Puts an item into a DynamoDB table.
    pub async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item.attributes))
            .send()
            .await
            .map_err(|e| service_error("PutItem", e))?;

        info!("Item added to '{table_name}'");
        Ok(())
    }

    /// Gets an item from a DynamoDB table.
    pub async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let response = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key.attributes))
            .send()
            .await
            .map_err(|e| service_error("GetItem", e))?;

        Ok(response.item.map(Item::from))
    }

    /// Updates the given attributes of an existing item.
    pub async fn update_item(&self, table_name: &str, key: Item, updates: Item) -> Result<()> {
        if updates.is_empty() {
            bail!("No attributes to update");
        }
        let update = UpdateExpression::from_item(&updates);

        self.client
            .update_item()
            .table_name(table_name)
            .set_key(Some(key.attributes))
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .send()
            .await
            .map_err(|e| service_error("UpdateItem", e))?;

        info!("Item updated in '{table_name}'");
        Ok(())
    }

    /// Deletes an item from a DynamoDB table.
    pub async fn delete_item(&self, table_name: &str, key: Item) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(key.attributes))
            .send()
            .await
            .map_err(|e| service_error("DeleteItem", e))?;

        info!("Item deleted from '{table_name}'");
        Ok(())
    }

    /// Serializes a record with serde_dynamo and puts it.
    pub async fn put_record<T: Serialize>(&self, table_name: &str, record: &T) -> Result<()> {
        let attributes: AttributeMap = serde_dynamo::to_item(record)?;
        self.put_item(table_name, Item::from(attributes)).await
    }

    /// Gets an item by key and deserializes it with serde_dynamo.
    pub async fn get_record<T: DeserializeOwned>(
        &self,
        table_name: &str,
        key: Item,
    ) -> Result<Option<T>> {
        self.get_item(table_name, key)
            .await?
            .map(|item| serde_dynamo::from_item(item.attributes).map_err(Into::into))
            .transpose()
    }

    /// Writes items with BatchWriteItem, at most 25 per request.
    ///
    /// Unprocessed items returned by the service are resubmitted after a short pause.
    pub async fn batch_put(&self, table_name: &str, items: Vec<Item>) -> Result<usize> {
        let mut written = 0;
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            let chunk = items
                .by_ref()
                .take(MAX_BATCH_SIZE)
                .map(|item| -> Result<WriteRequest> {
                    Ok(WriteRequest::builder()
                        .put_request(
                            PutRequest::builder()
                                .set_item(Some(item.attributes))
                                .build()?,
                        )
                        .build())
                })
                .collect::<Result<Vec<_>>>()?;
            let chunk_len = chunk.len();

            let mut pending = Some(HashMap::from([(table_name.to_string(), chunk)]));
            let mut attempt = 0u32;
            while let Some(request_items) = pending.take() {
                let output = self
                    .client
                    .batch_write_item()
                    .set_request_items(Some(request_items))
                    .send()
                    .await
                    .map_err(|e| service_error("BatchWriteItem", e))?;
                pending = output.unprocessed_items.filter(|unprocessed| {
                    unprocessed.values().any(|requests| !requests.is_empty())
                });
                if pending.is_some() {
                    attempt += 1;
                    if attempt > 5 {
                        bail!("BatchWriteItem left items unprocessed after {attempt} attempts");
                    }
                    warn!("Resubmitting unprocessed items (attempt {attempt})");
                    sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                }
            }
            written += chunk_len;
        }
        info!("Wrote {written} items to '{table_name}'");
        Ok(written)
    }

    // --- Query and Scan Operations ---

    /// Queries the items of one partition, optionally narrowed by a sort key condition.
    pub async fn query_items(
        &self,
        table_name: &str,
        partition_key: (&str, AttributeValue),
        sort_key_condition: Option<(&str, SortKeyCondition)>,
    ) -> Result<Vec<Item>> {
        let mut key_condition = "#pk = :pkval".to_string();
        let mut names = HashMap::from([("#pk".to_string(), partition_key.0.to_string())]);
        let mut values = HashMap::from([(":pkval".to_string(), partition_key.1)]);

        if let Some((sort_key, condition)) = sort_key_condition {
            key_condition.push_str(" AND ");
            key_condition.push_str(&condition.expression("#sk"));
            names.insert("#sk".to_string(), sort_key.to_string());
            values.extend(condition.into_values());
        }

        let mut items = Vec::new();
        let mut exclusive_start_key = None;
        loop {
            let response = self
                .client
                .query()
                .table_name(table_name)
                .key_condition_expression(&key_condition)
                .set_expression_attribute_names(Some(names.clone()))
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(|e| service_error("Query", e))?;

            items.extend(response.items.unwrap_or_default().into_iter().map(Item::from));
            exclusive_start_key = response.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    /// Scans a whole table, optionally filtered.
    pub async fn scan(
        &self,
        table_name: &str,
        filter_expression: Option<String>,
        expression_attribute_names: Option<HashMap<String, String>>,
        expression_attribute_values: Option<AttributeMap>,
    ) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut scan = self.client.scan().table_name(table_name);

            if let Some(filter) = filter_expression.as_ref().filter(|f| !f.is_empty()) {
                scan = scan.filter_expression(filter);
            }

            if let Some(names) = expression_attribute_names.as_ref().filter(|n| !n.is_empty()) {
                scan = scan.set_expression_attribute_names(Some(names.clone()));
            }

            if let Some(values) = expression_attribute_values.as_ref().filter(|v| !v.is_empty()) {
                scan = scan.set_expression_attribute_values(Some(values.clone()));
            }

            if let Some(key) = last_evaluated_key {
                scan = scan.set_exclusive_start_key(Some(key));
            }

            let response: ScanOutput = scan.send().await.map_err(|e| service_error("Scan", e))?;

            if let Some(new_items) = response.items {
                items.extend(new_items.into_iter().map(Item::from));
            }

            last_evaluated_key = response.last_evaluated_key;

            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    /// Reads a single scan page, returning the key to continue from.
    pub async fn scan_page(
        &self,
        table_name: &str,
        limit: Option<i32>,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<(Vec<Item>, Option<AttributeMap>)> {
        let response = self
            .client
            .scan()
            .table_name(table_name)
            .set_limit(limit)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(|e| service_error("Scan", e))?;

        let items = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Item::from)
            .collect();
        Ok((items, response.last_evaluated_key))
    }

    // --- PartiQL ---

    /// Runs a PartiQL statement, following `NextToken` until all results are read.
    pub async fn execute_statement(
        &self,
        statement: &str,
        parameters: Vec<AttributeValue>,
    ) -> Result<Vec<Item>> {
        let parameters = (!parameters.is_empty()).then_some(parameters);
        let mut items = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .client
                .execute_statement()
                .statement(statement)
                .set_parameters(parameters.clone())
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| service_error("ExecuteStatement", e))?;

            items.extend(output.items.unwrap_or_default().into_iter().map(Item::from));
            next_token = output.next_token;
            if next_token.is_none() {
                break;
            }
        }
        Ok(items)
    }

    /// Runs up to 25 PartiQL statements in one request.
    ///
    /// Each statement succeeds or fails on its own; failures are returned as
    /// `Err(code: message)` in the statement's slot.
    pub async fn batch_execute_statement(
        &self,
        statements: Vec<(String, Vec<AttributeValue>)>,
    ) -> Result<Vec<std::result::Result<Option<Item>, String>>> {
        if statements.is_empty() {
            bail!("BatchExecuteStatement needs at least one statement");
        }
        if statements.len() > MAX_BATCH_SIZE {
            bail!(
                "BatchExecuteStatement accepts at most {MAX_BATCH_SIZE} statements, got {}",
                statements.len()
            );
        }
        let requests = statements
            .into_iter()
            .map(|(statement, parameters)| {
                BatchStatementRequest::builder()
                    .statement(statement)
                    .set_parameters((!parameters.is_empty()).then_some(parameters))
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let output = self
            .client
            .batch_execute_statement()
            .set_statements(Some(requests))
            .send()
            .await
            .map_err(|e| service_error("BatchExecuteStatement", e))?;

        Ok(output
            .responses()
            .iter()
            .map(|response| match response.error() {
                Some(err) => Err(format!(
                    "{}: {}",
                    err.code().map(|c| c.as_str()).unwrap_or("Unknown"),
                    err.message().unwrap_or_default()
                )),
                None => Ok(response.item().cloned().map(Item::from)),
            })
            .collect())
    }
}

fn table_poll_state(status: Option<TableStatus>) -> PollState<()> {
    match status {
        Some(TableStatus::Active) => PollState::Ready(()),
        Some(TableStatus::Creating) | Some(TableStatus::Updating) | None => {
            PollState::Pending(status.map_or("UNKNOWN".to_string(), |s| s.as_str().to_string()))
        }
        Some(other) => PollState::Failed(format!("table is {}", other.as_str())),
    }
}

/// A `SET` update expression with a placeholder for every attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: AttributeMap,
}

impl UpdateExpression {
    pub fn from_item(updates: &Item) -> Self {
        let mut attributes: Vec<_> = updates.attributes.iter().collect();
        attributes.sort_by(|a, b| a.0.cmp(b.0));

        let mut assignments = Vec::with_capacity(attributes.len());
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        for (i, (attr_name, attr_value)) in attributes.into_iter().enumerate() {
            let placeholder = format!("#attr{i}");
            let value_placeholder = format!(":val{i}");
            assignments.push(format!("{placeholder} = {value_placeholder}"));
            names.insert(placeholder, attr_name.clone());
            values.insert(value_placeholder, attr_value.clone());
        }

        Self {
            expression: format!("SET {}", assignments.join(", ")),
            names,
            values,
        }
    }
}

/// A condition on the sort key inside a query's key condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKeyCondition {
    Equal(AttributeValue),
    LessThan(AttributeValue),
    LessOrEqual(AttributeValue),
    GreaterThan(AttributeValue),
    GreaterOrEqual(AttributeValue),
    BeginsWith(AttributeValue),
    Between(AttributeValue, AttributeValue),
}

impl SortKeyCondition {
    /// Builds a condition from an operator as typed on the command line.
    pub fn parse(
        operator: &str,
        value: AttributeValue,
        upper: Option<AttributeValue>,
    ) -> Result<Self> {
        Ok(match operator.trim().to_ascii_lowercase().as_str() {
            "=" => Self::Equal(value),
            "<" => Self::LessThan(value),
            "<=" => Self::LessOrEqual(value),
            ">" => Self::GreaterThan(value),
            ">=" => Self::GreaterOrEqual(value),
            "begins_with" => Self::BeginsWith(value),
            "between" => Self::Between(
                value,
                upper.ok_or_else(|| anyhow!("BETWEEN needs an upper bound"))?,
            ),
            other => bail!("Unsupported sort key operator '{other}'"),
        })
    }

    /// The condition text, referring to the sort key by `name_placeholder`.
    pub fn expression(&self, name_placeholder: &str) -> String {
        let compare = |op: &str| format!("{name_placeholder} {op} :skval");
        match self {
            Self::Equal(_) => compare("="),
            Self::LessThan(_) => compare("<"),
            Self::LessOrEqual(_) => compare("<="),
            Self::GreaterThan(_) => compare(">"),
            Self::GreaterOrEqual(_) => compare(">="),
            Self::BeginsWith(_) => format!("begins_with({name_placeholder}, :skval)"),
            Self::Between(_, _) => format!("{name_placeholder} BETWEEN :skval AND :skval2"),
        }
    }

    pub fn into_values(self) -> Vec<(String, AttributeValue)> {
        match self {
            Self::Equal(v)
            | Self::LessThan(v)
            | Self::LessOrEqual(v)
            | Self::GreaterThan(v)
            | Self::GreaterOrEqual(v)
            | Self::BeginsWith(v) => vec![(":skval".to_string(), v)],
            Self::Between(low, high) => vec![
                (":skval".to_string(), low),
                (":skval2".to_string(), high),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_config::{BehaviorVersion, Region, SdkConfig};

    fn offline_client() -> DynamoDb {
        let config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        DynamoDb::new(&config)
    }

    #[tokio::test]
    async fn batch_statements_need_one_to_twenty_five() {
        let ddb = offline_client();

        let err = ddb.batch_execute_statement(Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("at least one statement"));

        let statements = (0..=MAX_BATCH_SIZE)
            .map(|i| (format!("SELECT * FROM \"Movies\" WHERE year = {i}"), Vec::new()))
            .collect();
        let err = ddb.batch_execute_statement(statements).await.unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn update_expression_uses_placeholders() {
        let updates = Item::new()
            .set_number("rating", 9.1)
            .set_string("plot", "Nothing happens");
        let update = UpdateExpression::from_item(&updates);

        assert_eq!(update.expression, "SET #attr0 = :val0, #attr1 = :val1");
        assert_eq!(update.names["#attr0"], "plot");
        assert_eq!(update.names["#attr1"], "rating");
        assert_eq!(
            update.values[":val1"],
            AttributeValue::N("9.1".to_string())
        );
    }

    #[test]
    fn sort_key_conditions_render() {
        let s = |v: &str| AttributeValue::S(v.to_string());

        let cond = SortKeyCondition::parse("begins_with", s("Prod"), None).unwrap();
        assert_eq!(cond.expression("#sk"), "begins_with(#sk, :skval)");

        let cond = SortKeyCondition::parse(">=", s("B"), None).unwrap();
        assert_eq!(cond.expression("#sk"), "#sk >= :skval");

        let cond = SortKeyCondition::parse("BETWEEN", s("A"), Some(s("M"))).unwrap();
        assert_eq!(cond.expression("#sk"), "#sk BETWEEN :skval AND :skval2");
        assert_eq!(cond.into_values().len(), 2);
    }

    #[test]
    fn sort_key_condition_rejects_bad_input() {
        let v = AttributeValue::S("x".to_string());
        assert!(SortKeyCondition::parse("between", v.clone(), None).is_err());
        assert!(SortKeyCondition::parse("!=", v, None).is_err());
    }

    #[test]
    fn table_status_maps_to_poll_state() {
        assert_eq!(table_poll_state(Some(TableStatus::Active)), PollState::Ready(()));
        assert_eq!(
            table_poll_state(Some(TableStatus::Creating)),
            PollState::Pending("CREATING".to_string())
        );
        assert!(matches!(
            table_poll_state(Some(TableStatus::Deleting)),
            PollState::Failed(_)
        ));
    }
}
