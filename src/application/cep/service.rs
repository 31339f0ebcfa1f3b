use std::sync::Arc;

use tracing::{error, info};

use crate::domain::cep::{normalize_cep, parse_cep};
use crate::domain::{Address, CepFilter, CepGateway, CepRepository, DomainResult};
use crate::shared::{ApiResponse, NoticeCode};

pub const MSG_INVALID_CEP: &str = "CEP inválido.";
pub const MSG_CEP_NOT_FOUND: &str = "CEP não encontrado.";

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;

pub struct CepService {
    repository: Arc<dyn CepRepository>,
    gateway: Arc<dyn CepGateway>,
}

impl CepService {
    pub fn new(repository: Arc<dyn CepRepository>, gateway: Arc<dyn CepGateway>) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    /// Lookup by the numeric form used in the query string (`?cep=1001000`).
    pub async fn lookup_number(&self, cep: i64) -> ApiResponse<Address> {
        match normalize_cep(cep) {
            Some(cep) => self.lookup(&cep).await,
            None => ApiResponse::error(NoticeCode::ErrorBadRequest, MSG_INVALID_CEP),
        }
    }

    /// Lookup by text, hyphen allowed.
    pub async fn lookup_text(&self, cep: &str) -> ApiResponse<Address> {
        match parse_cep(cep) {
            Some(cep) => self.lookup(&cep).await,
            None => ApiResponse::error(NoticeCode::ErrorBadRequest, MSG_INVALID_CEP),
        }
    }

    async fn lookup(&self, cep: &str) -> ApiResponse<Address> {
        match self.resolve(cep).await {
            Ok(Some(address)) => ApiResponse::success(address),
            Ok(None) => ApiResponse::error(NoticeCode::ErrorNotFound, MSG_CEP_NOT_FOUND),
            Err(e) => {
                error!(cep, error = %e, "CEP lookup failed");
                ApiResponse::error(NoticeCode::ServerErrorInternalServerError, e.to_string())
            }
        }
    }

    /// Cache first, then the gateway; gateway hits are stored.
    pub async fn resolve(&self, cep: &str) -> DomainResult<Option<Address>> {
        if let Some(address) = self.repository.find(cep).await? {
            return Ok(Some(address));
        }

        let Some(address) = self.gateway.fetch(cep).await? else {
            return Ok(None);
        };
        self.repository.save(&address).await?;
        info!(cep = %address.cep, "CEP cached");
        Ok(Some(address))
    }

    /// Stored addresses, ordered by CEP. A zero limit means the default page.
    pub async fn list(&self, mut filter: CepFilter) -> DomainResult<Vec<Address>> {
        filter.limit = match filter.limit {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        self.repository.list(filter).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::InMemoryCepRepository;

    fn se() -> Address {
        Address {
            cep: "01001000".into(),
            logradouro: "Praça da Sé".into(),
            complemento: "lado ímpar".into(),
            bairro: "Sé".into(),
            localidade: "São Paulo".into(),
            uf: "SP".into(),
            ibge: "3550308".into(),
            ddd: "11".into(),
        }
    }

    #[derive(Default)]
    struct CountingGateway {
        calls: AtomicUsize,
        down: bool,
    }

    #[async_trait]
    impl CepGateway for CountingGateway {
        async fn fetch(&self, cep: &str) -> DomainResult<Option<Address>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.down {
                return Err(DomainError::Upstream("timeout".into()));
            }
            Ok((cep == "01001000").then(se))
        }
    }

    fn service(gateway: Arc<CountingGateway>) -> (CepService, Arc<InMemoryCepRepository>) {
        let repo = Arc::new(InMemoryCepRepository::new());
        (CepService::new(repo.clone(), gateway), repo)
    }

    #[tokio::test]
    async fn gateway_hit_is_cached() {
        let gateway = Arc::new(CountingGateway::default());
        let (service, repo) = service(gateway.clone());

        let first = service.lookup_number(1001000).await;
        assert_eq!(first.data, Some(se()));
        let second = service.lookup_text("01001-000").await;
        assert_eq!(second.data, Some(se()));

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert!(repo.find("01001000").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn miss_and_invalid_input() {
        let (service, _) = service(Arc::new(CountingGateway::default()));

        let missing = service.lookup_number(2002000).await;
        assert_eq!(missing.notices[0].code, NoticeCode::ErrorNotFound);
        assert_eq!(missing.notices[0].message, MSG_CEP_NOT_FOUND);

        let invalid = service.lookup_number(0).await;
        assert_eq!(invalid.notices[0].code, NoticeCode::ErrorBadRequest);
        assert_eq!(invalid.notices[0].message, MSG_INVALID_CEP);
    }

    #[tokio::test]
    async fn gateway_failure_is_a_server_error() {
        let (service, _) = service(Arc::new(CountingGateway {
            down: true,
            ..CountingGateway::default()
        }));
        let response = service.lookup_number(1001000).await;
        assert!(!response.success);
        assert!(response.notices[0].code.is_server_error());
    }

    #[tokio::test]
    async fn list_clamps_page_size() {
        let (service, repo) = service(Arc::new(CountingGateway::default()));
        for n in 1..=120 {
            let mut address = se();
            address.cep = format!("{:08}", n);
            repo.save(&address).await.unwrap();
        }

        assert_eq!(service.list(CepFilter::default()).await.unwrap().len(), 50);
        let capped = service
            .list(CepFilter {
                limit: 500,
                ..CepFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(capped.len(), 100);
    }
}
