//! CEP lookup with a local cache in front of the remote directory

pub mod service;

pub use service::CepService;
