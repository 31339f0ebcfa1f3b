//! GraphQL read API over the CEP cache

pub mod handlers;
pub mod schema;

pub use schema::{create_schema, ToolsSchema};
