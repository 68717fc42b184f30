//! # DynamoDB samples
//!
//! Table lifecycle, single-item CRUD, queries and scans, serde-backed
//! records, batch writes, and PartiQL statements.
//!
//! ## Components
//!
//! - `DynamoDb`: client wrapper holding every sample operation.
//! - `Item`: attribute map builder used for keys and items.
//! - `Schema` / `FieldType`: expected attributes and their scalar types.
//! - `Table`: table name plus key attributes.
//! - `Movie`: serde DTO for the movies table used by the CLI samples.
//!
//! Credentials and region come from the usual AWS provider chain
//! (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_REGION`, profiles).
//! Set `AWS_ENDPOINT_URL=http://localhost:8000` to run against DynamoDB Local.

mod client;
mod item;
mod movie;
mod schema;
mod table;

pub use client::{DynamoDb, SortKeyCondition, UpdateExpression, MAX_BATCH_SIZE};
pub use item::Item;
pub use movie::{Movie, MovieInfo, MOVIE_PARTITION_KEY, MOVIE_SORT_KEY};
pub use schema::{FieldType, Schema};
pub use table::{KeyAttribute, Table};
