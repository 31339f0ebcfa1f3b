use async_trait::async_trait;

use super::{Address, CepFilter};
use crate::domain::DomainResult;

/// Local store of resolved addresses
#[async_trait]
pub trait CepRepository: Send + Sync {
    async fn find(&self, cep: &str) -> DomainResult<Option<Address>>;
    async fn save(&self, address: &Address) -> DomainResult<()>;
    async fn list(&self, filter: CepFilter) -> DomainResult<Vec<Address>>;
}

/// Remote postal-code directory
#[async_trait]
pub trait CepGateway: Send + Sync {
    /// `Ok(None)` when the directory has no such CEP.
    async fn fetch(&self, cep: &str) -> DomainResult<Option<Address>>;
}
