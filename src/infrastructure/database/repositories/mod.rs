//! Database repository implementations
//!
//! Per-aggregate SeaORM stores behind the domain traits.

pub mod account_repository;
pub mod cep_repository;

pub use account_repository::SeaOrmCredentialStore;
pub use cep_repository::SeaOrmCepRepository;
