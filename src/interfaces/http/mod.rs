//! HTTP interfaces
//!
//! - `common`: envelope responses and the validated JSON extractor
//! - `middleware`: bearer authentication
//! - `modules`: per-resource DTOs and handlers
//! - `router`: route table, OpenAPI document and Swagger UI

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiContext};
