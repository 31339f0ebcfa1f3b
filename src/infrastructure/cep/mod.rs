//! Remote postal-code directories

mod viacep;

pub use viacep::ViaCepGateway;
