use anyhow::Result;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::types::AttributeValue;
use clap::{Parser, Subcommand, ValueEnum};

use super::prompt::confirm;
use super::shell::{self, format_item, parse_typed_value};
use crate::dynamodb::{
    DynamoDb, FieldType, Item, Movie, Schema, SortKeyCondition, Table, MOVIE_PARTITION_KEY,
    MOVIE_SORT_KEY,
};

#[derive(Debug, Parser)]
pub struct DynamoDbCommand {
    #[command(subcommand)]
    pub action: DynamoDbAction,
}

/// Key attribute type as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyType {
    S,
    N,
}

impl From<KeyType> for FieldType {
    fn from(key_type: KeyType) -> Self {
        match key_type {
            KeyType::S => FieldType::String,
            KeyType::N => FieldType::Number,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum DynamoDbAction {
    /// Check that the credentials can call DynamoDB.
    CheckAuth,
    /// List table names.
    ListTables,
    /// Create an on-demand table and wait until it is active.
    CreateTable {
        table: String,
        #[arg(long)]
        partition_key: String,
        #[arg(long, value_enum, default_value = "s")]
        partition_key_type: KeyType,
        #[arg(long)]
        sort_key: Option<String>,
        #[arg(long, value_enum, default_value = "s")]
        sort_key_type: KeyType,
    },
    /// Show a table's status and size.
    DescribeTable { table: String },
    /// Delete a table.
    DeleteTable { table: String },
    /// Put a movie into a movies table (year N / title S keys).
    PutMovie {
        table: String,
        year: i32,
        title: String,
        #[arg(long)]
        plot: Option<String>,
        #[arg(long)]
        rating: Option<f64>,
    },
    /// Get a movie by year and title.
    GetMovie {
        table: String,
        year: i32,
        title: String,
    },
    /// Query one partition. Key values use TYPE:VALUE, e.g. N:2013.
    Query {
        table: String,
        #[arg(long)]
        partition_key: String,
        #[arg(long, value_parser = parse_typed_value_arg)]
        value: AttributeValue,
        #[arg(long, requires = "sort_operator")]
        sort_key: Option<String>,
        /// =, <, <=, >, >=, begins_with or between.
        #[arg(long, requires_all = ["sort_key", "sort_value"])]
        sort_operator: Option<String>,
        #[arg(long, value_parser = parse_typed_value_arg)]
        sort_value: Option<AttributeValue>,
        /// Upper bound for `between`.
        #[arg(long, value_parser = parse_typed_value_arg)]
        sort_upper: Option<AttributeValue>,
    },
    /// Scan a whole table.
    Scan { table: String },
    /// Run a PartiQL statement with TYPE:VALUE positional parameters.
    Partiql {
        statement: String,
        #[arg(long = "param", value_parser = parse_typed_value_arg)]
        params: Vec<AttributeValue>,
    },
    /// Open the interactive shell on a table.
    Shell {
        table: String,
        #[arg(long)]
        partition_key: String,
        #[arg(long, value_enum, default_value = "s")]
        partition_key_type: KeyType,
        #[arg(long)]
        sort_key: Option<String>,
        #[arg(long, value_enum, default_value = "s")]
        sort_key_type: KeyType,
        /// Non-key attribute, NAME:s or NAME:n. Repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, FieldType)>,
    },
}

pub async fn run(sdk_config: &SdkConfig, cmd: DynamoDbCommand, yes: bool) -> Result<()> {
    let ddb = DynamoDb::new(sdk_config);
    match cmd.action {
        DynamoDbAction::CheckAuth => ddb.check_auth().await?,
        DynamoDbAction::ListTables => {
            let tables = ddb.list_tables().await?;
            tables.iter().for_each(|t| println!("{t}"));
            println!("Found {} tables", tables.len());
        }
        DynamoDbAction::CreateTable {
            table,
            partition_key,
            partition_key_type,
            sort_key,
            sort_key_type,
        } => {
            let definition = Table::new(&table, &partition_key, sort_key.as_deref())
                .with_key_types(partition_key_type.into(), sort_key_type.into());
            ddb.create_table_if_not_exists(&definition).await?;
            ddb.wait_for_table_active(&table).await?;
            println!("Table {table} is active");
        }
        DynamoDbAction::DescribeTable { table } => {
            let output = ddb.describe_table(&table).await?;
            if let Some(details) = output.table() {
                println!("Name: {}", details.table_name().unwrap_or_default());
                println!("Status: {:?}", details.table_status());
                println!("Items (approximate): {}", details.item_count().unwrap_or_default());
                for key in details.key_schema() {
                    println!("Key: {} ({})", key.attribute_name(), key.key_type().as_str());
                }
            }
        }
        DynamoDbAction::DeleteTable { table } => {
            if confirm(&format!("Delete table {table}"), yes)? {
                ddb.delete_table(&table).await?;
            }
        }
        DynamoDbAction::PutMovie {
            table,
            year,
            title,
            plot,
            rating,
        } => {
            let movie = Movie::new(year, title).with_info(plot, rating);
            ddb.put_record(&table, &movie).await?;
            println!("Added {} ({})", movie.title, movie.year);
        }
        DynamoDbAction::GetMovie { table, year, title } => {
            let key = movie_key(year, &title);
            match ddb.get_record::<Movie>(&table, key).await? {
                Some(movie) => println!("{movie:#?}"),
                None => println!("{title} ({year}) not found"),
            }
        }
        DynamoDbAction::Query {
            table,
            partition_key,
            value,
            sort_key,
            sort_operator,
            sort_value,
            sort_upper,
        } => {
            let sort_key_condition = match (sort_key.as_deref(), sort_operator, sort_value) {
                (Some(name), Some(operator), Some(value)) => {
                    Some((name, SortKeyCondition::parse(&operator, value, sort_upper)?))
                }
                _ => None,
            };
            let items = ddb
                .query_items(&table, (&partition_key, value), sort_key_condition)
                .await?;
            print_items(&items);
        }
        DynamoDbAction::Scan { table } => {
            let items = ddb.scan(&table, None, None, None).await?;
            print_items(&items);
        }
        DynamoDbAction::Partiql { statement, params } => {
            let items = ddb.execute_statement(&statement, params).await?;
            print_items(&items);
        }
        DynamoDbAction::Shell {
            table,
            partition_key,
            partition_key_type,
            sort_key,
            sort_key_type,
            fields,
        } => {
            let schema = fields
                .into_iter()
                .fold(Schema::new(), |schema, (name, field_type)| {
                    schema.add_field(name, field_type)
                });
            let definition = Table::new(&table, &partition_key, sort_key.as_deref())
                .with_key_types(partition_key_type.into(), sort_key_type.into())
                .with_schema(schema);
            shell::run(&ddb, &definition).await?;
        }
    }
    Ok(())
}

fn movie_key(year: i32, title: &str) -> Item {
    Item::new()
        .set_number(MOVIE_PARTITION_KEY, year)
        .set_string(MOVIE_SORT_KEY, title)
}

fn print_items(items: &[Item]) {
    items.iter().for_each(|item| println!("{}", format_item(item)));
    println!("{} items", items.len());
}

fn parse_typed_value_arg(raw: &str) -> Result<AttributeValue, String> {
    parse_typed_value(raw).map_err(|e| e.to_string())
}

fn parse_field(raw: &str) -> Result<(String, FieldType), String> {
    let (name, kind) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:s or NAME:n, got '{raw}'"))?;
    let field_type = match kind.to_ascii_lowercase().as_str() {
        "s" => FieldType::String,
        "n" => FieldType::Number,
        other => return Err(format!("unknown field type '{other}'")),
    };
    Ok((name.to_string(), field_type))
}
