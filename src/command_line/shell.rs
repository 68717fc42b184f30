use anyhow::{anyhow, Result};
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

use super::prompt::{prompt, prompt_bool, prompt_optional, read_prompt};
use crate::dynamodb::{DynamoDb, FieldType, Item, SortKeyCondition, Table};

const COMMANDS: &str = "info/put/get/update/delete/query/scan/page/partiql/exit";

/// Interactive loop over one table.
///
/// - info: table status and item count
/// - put / get / update / delete: single-item operations, prompting for keys
/// - query: one partition, with an optional sort key condition
/// - scan: whole table, optional filter
/// - page: scan one page at a time
/// - partiql: run a PartiQL statement
/// - exit: leave the shell (also on end of input)
pub async fn run(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    loop {
        let Some(command) = read_prompt(&format!("Enter command ({COMMANDS})"), None)? else {
            break;
        };
        let result = match command.as_str() {
            "info" => print_info(ddb, table).await,
            "put" => put_item(ddb, table).await,
            "get" => get_item(ddb, table).await,
            "update" => update_item(ddb, table).await,
            "delete" => delete_item(ddb, table).await,
            "query" => query_items(ddb, table).await,
            "scan" => scan_items(ddb, table).await,
            "page" => scan_pages(ddb, table).await,
            "partiql" => run_partiql(ddb).await,
            "exit" | "quit" => break,
            "" => continue,
            _ => {
                println!("Unknown command. Please try again.");
                continue;
            }
        };
        // A failed command should not end the session.
        if let Err(e) = result {
            println!("Error: {e:#}");
        }
    }
    Ok(())
}

async fn print_info(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let description = ddb.describe_table(table.name()).await?;
    let details = description
        .table()
        .ok_or_else(|| anyhow!("Table '{}' has no description", table.name()))?;

    println!("\n--- Table Information ---");
    println!("Table Name: {}", table.name());
    for key in table.key_attributes() {
        println!("Key: {} ({:?})", key.name, key.field_type);
    }
    if let Some(schema) = table.schema() {
        println!("Schema:");
        for (field, field_type) in schema.fields() {
            println!("  {}: {:?}", field, field_type);
        }
    }
    println!("Status: {:?}", details.table_status());
    println!("Item Count (approximate): {}", details.item_count().unwrap_or_default());
    println!("Size (bytes, approximate): {}", details.table_size_bytes().unwrap_or_default());
    println!("-------------------------\n");
    Ok(())
}

async fn put_item(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let mut item = create_key_item(table)?;
    if let Some(schema) = table.schema() {
        for (field_name, field_type) in schema.fields() {
            if table.is_key(field_name) {
                continue;
            }
            if let Some(value) = prompt_optional(&format!("Enter {field_name}"), None)? {
                item = item.set(field_name, field_type.attribute_value(&value)?);
            }
        }
    }
    ddb.put_item(table.name(), item).await?;
    println!("Item added successfully!");
    Ok(())
}

async fn get_item(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let key = create_key_item(table)?;
    match ddb.get_item(table.name(), key).await? {
        Some(item) => print_items("Item", &[item]),
        None => println!("Item not found"),
    }
    Ok(())
}

async fn update_item(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let key = create_key_item(table)?;
    let schema = table
        .schema()
        .ok_or_else(|| anyhow!("Table schema not defined"))?;
    let mut updates = Item::new();
    for (field_name, field_type) in schema.fields() {
        if !table.is_key(field_name) && prompt_bool(&format!("Update {field_name}?"), false)? {
            let value = prompt(&format!("Enter new value for {field_name}"), None)?;
            updates = updates.set(field_name, field_type.attribute_value(&value)?);
        }
    }
    ddb.update_item(table.name(), key, updates).await?;
    println!("Item updated successfully!");
    Ok(())
}

async fn delete_item(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let key = create_key_item(table)?;
    ddb.delete_item(table.name(), key).await?;
    println!("Item deleted successfully!");
    Ok(())
}

async fn query_items(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let keys = table.key_attributes();
    let partition = keys[0];
    let value = prompt(&format!("Enter {} value", partition.name), None)?;
    let partition_key = (partition.name, partition.field_type.attribute_value(&value)?);

    let sort_key_condition = match keys.get(1) {
        Some(sort) => {
            match prompt_optional(
                &format!("Enter condition for {} (=, <, <=, >, >=, begins_with, between; Enter for none)", sort.name),
                None,
            )? {
                Some(operator) => {
                    let low = prompt(&format!("Enter value for {}", sort.name), None)?;
                    let high = if operator.eq_ignore_ascii_case("between") {
                        Some(sort.field_type.attribute_value(&prompt("Enter upper bound", None)?)?)
                    } else {
                        None
                    };
                    Some((
                        sort.name,
                        SortKeyCondition::parse(&operator, sort.field_type.attribute_value(&low)?, high)?,
                    ))
                }
                None => None,
            }
        }
        None => None,
    };

    let items = ddb
        .query_items(table.name(), partition_key, sort_key_condition)
        .await?;
    print_items("Query Results", &items);
    Ok(())
}

async fn scan_items(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let filter_expression = prompt_optional(
        "Enter filter expression (or press Enter for no filter)",
        Some("#price > :min"),
    )?;

    let (names, values) = if filter_expression.is_some() {
        (get_expression_attribute_names()?, get_expression_attribute_values()?)
    } else {
        (HashMap::new(), HashMap::new())
    };

    let items = ddb
        .scan(table.name(), filter_expression, Some(names), Some(values))
        .await?;
    print_items("Scan Results", &items);
    Ok(())
}

async fn scan_pages(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    let limit = prompt_optional("Enter page size", Some("10"))?
        .map(|s| s.parse::<i32>())
        .transpose()?;

    let mut exclusive_start_key = None;
    let mut page_num = 1;
    loop {
        let (items, last_evaluated_key) = ddb
            .scan_page(table.name(), limit, exclusive_start_key)
            .await?;
        print_items(&format!("Page {page_num}"), &items);

        if last_evaluated_key.is_none() || !prompt_bool("Continue to next page?", true)? {
            break;
        }
        exclusive_start_key = last_evaluated_key;
        page_num += 1;
    }
    Ok(())
}

async fn run_partiql(ddb: &DynamoDb) -> Result<()> {
    let statement = prompt("Enter PartiQL statement", Some("SELECT * FROM \"movies\" WHERE year = ?"))?;
    let mut parameters = Vec::new();
    while let Some(raw) = prompt_optional("Enter parameter as S:value or N:value (Enter to finish)", None)? {
        parameters.push(parse_typed_value(&raw)?);
    }
    let items = ddb.execute_statement(&statement, parameters).await?;
    print_items("PartiQL Results", &items);
    Ok(())
}

fn create_key_item(table: &Table<'_>) -> Result<Item> {
    let mut key = Item::new();
    for attribute in table.key_attributes() {
        let value = prompt(&format!("Enter {}", attribute.name), None)?;
        key = key.set(attribute.name, attribute.field_type.attribute_value(&value)?);
    }
    Ok(key)
}

fn get_expression_attribute_names() -> Result<HashMap<String, String>> {
    let mut names = HashMap::new();
    while let Some(placeholder) =
        prompt_optional("Enter attribute name placeholder (or press Enter to finish)", Some("#price"))?
    {
        let name = prompt("Enter attribute name", Some("price"))?;
        names.insert(placeholder, name);
    }
    Ok(names)
}

fn get_expression_attribute_values() -> Result<HashMap<String, AttributeValue>> {
    let mut values = HashMap::new();
    while let Some(placeholder) =
        prompt_optional("Enter value placeholder (or press Enter to finish)", Some(":min"))?
    {
        let value = prompt("Enter value as S:value or N:value", Some("N:25"))?;
        values.insert(placeholder, parse_typed_value(&value)?);
    }
    Ok(values)
}

/// Parses `S:text`, `N:42`, or `BOOL:true` into an attribute value.
pub fn parse_typed_value(raw: &str) -> Result<AttributeValue> {
    let (kind, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("expected TYPE:VALUE, got '{raw}'"))?;
    match kind.to_ascii_uppercase().as_str() {
        "S" => FieldType::String.attribute_value(value),
        "N" => FieldType::Number.attribute_value(value),
        "BOOL" => Ok(AttributeValue::Bool(value.trim().parse()?)),
        other => Err(anyhow!("Unsupported value type '{other}'")),
    }
}

fn print_items(title: &str, items: &[Item]) {
    println!("\n--- {} ({}) ---", title, items.len());
    items.iter().for_each(|item| println!("{}", format_item(item)));
    println!("{}", "-".repeat(title.len() + 8));
}

/// Renders an item as `name=value` pairs in name order.
pub fn format_item(item: &Item) -> String {
    let mut pairs: Vec<_> = item
        .attributes()
        .iter()
        .map(|(name, value)| format!("{name}={}", format_value(value)))
        .collect();
    pairs.sort();
    pairs.join(", ")
}

fn format_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::S(s) => format!("{s:?}"),
        AttributeValue::N(n) => n.clone(),
        AttributeValue::Bool(b) => b.to_string(),
        AttributeValue::Null(_) => "null".to_string(),
        AttributeValue::M(map) => {
            let mut pairs: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", format_value(v)))
                .collect();
            pairs.sort();
            format!("{{{}}}", pairs.join(", "))
        }
        AttributeValue::L(list) => format!(
            "[{}]",
            list.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_values_parse() {
        assert_eq!(
            parse_typed_value("S:Rush").unwrap(),
            AttributeValue::S("Rush".to_string())
        );
        assert_eq!(
            parse_typed_value("n:2013").unwrap(),
            AttributeValue::N("2013".to_string())
        );
        assert_eq!(parse_typed_value("BOOL:true").unwrap(), AttributeValue::Bool(true));
        assert!(parse_typed_value("N:twenty").is_err());
        assert!(parse_typed_value("Rush").is_err());
    }

    #[test]
    fn items_render_sorted() {
        let item = Item::new()
            .set_string("title", "Rush")
            .set_number("year", 2013)
            .set(
                "info",
                AttributeValue::M(HashMap::from([(
                    "rating".to_string(),
                    AttributeValue::N("8.3".to_string()),
                )])),
            );
        assert_eq!(
            format_item(&item),
            "info={rating: 8.3}, title=\"Rush\", year=2013"
        );
    }
}
