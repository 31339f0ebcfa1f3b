//! Application layer - use-case orchestration over the domain traits

pub mod cep;
pub mod identity;

pub use cep::CepService;
pub use identity::AccountService;
