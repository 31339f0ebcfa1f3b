//! In-memory storage implementations

mod accounts;
mod ceps;

pub use accounts::InMemoryCredentialStore;
pub use ceps::InMemoryCepRepository;
