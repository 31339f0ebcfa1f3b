//! # TOOLS.API
//!
//! Account registration with e-mail activation, JWT authentication and
//! Brazilian postal code (CEP) lookup.
//!
//! ## Architecture
//!
//! - **domain**: entities, identity rules and capability traits
//! - **application**: account and CEP use cases returning response envelopes
//! - **infrastructure**: SeaORM and in-memory stores, JWT, bcrypt, SMTP, ViaCEP
//! - **interfaces**: axum REST routes, GraphQL, Swagger UI
//! - **shared**: envelope, clock and shutdown primitives

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;
