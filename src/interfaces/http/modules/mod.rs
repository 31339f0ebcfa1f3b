pub mod cep;
pub mod config;
pub mod graphql;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod security;
