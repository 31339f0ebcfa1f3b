//! CEP (Brazilian postal code) lookup

pub mod model;
pub mod repository;

pub use model::{normalize_cep, parse_cep, Address, CepFilter};
pub use repository::{CepGateway, CepRepository};
