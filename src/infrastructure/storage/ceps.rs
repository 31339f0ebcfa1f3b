//! In-memory address cache

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{Address, CepFilter, CepRepository, DomainResult};

/// [`CepRepository`] keyed by normalized CEP
#[derive(Default)]
pub struct InMemoryCepRepository {
    addresses: DashMap<String, Address>,
}

impl InMemoryCepRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(filter: &CepFilter, address: &Address) -> bool {
    let uf_ok = filter
        .uf
        .as_deref()
        .map_or(true, |uf| address.uf.eq_ignore_ascii_case(uf));
    let city_ok = filter
        .localidade
        .as_deref()
        .map_or(true, |city| address.localidade == city);
    uf_ok && city_ok
}

#[async_trait]
impl CepRepository for InMemoryCepRepository {
    async fn find(&self, cep: &str) -> DomainResult<Option<Address>> {
        Ok(self.addresses.get(cep).map(|a| a.clone()))
    }

    async fn save(&self, address: &Address) -> DomainResult<()> {
        self.addresses.insert(address.cep.clone(), address.clone());
        Ok(())
    }

    async fn list(&self, filter: CepFilter) -> DomainResult<Vec<Address>> {
        let mut result: Vec<Address> = self
            .addresses
            .iter()
            .filter(|a| matches(&filter, a.value()))
            .map(|a| a.value().clone())
            .collect();
        result.sort_by(|a, b| a.cep.cmp(&b.cep));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(cep: &str, uf: &str, city: &str) -> Address {
        Address {
            cep: cep.into(),
            logradouro: "Praça da Sé".into(),
            complemento: "lado ímpar".into(),
            bairro: "Sé".into(),
            localidade: city.into(),
            uf: uf.into(),
            ibge: "3550308".into(),
            ddd: "11".into(),
        }
    }

    #[tokio::test]
    async fn save_then_find() {
        let repo = InMemoryCepRepository::new();
        let se = address("01001000", "SP", "São Paulo");
        repo.save(&se).await.unwrap();

        assert_eq!(repo.find("01001000").await.unwrap(), Some(se));
        assert_eq!(repo.find("99999999").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_filters_orders_and_pages() {
        let repo = InMemoryCepRepository::new();
        repo.save(&address("20040002", "RJ", "Rio de Janeiro")).await.unwrap();
        repo.save(&address("01310100", "SP", "São Paulo")).await.unwrap();
        repo.save(&address("01001000", "SP", "São Paulo")).await.unwrap();

        let sp = repo
            .list(CepFilter {
                uf: Some("sp".into()),
                limit: 10,
                ..CepFilter::default()
            })
            .await
            .unwrap();
        let ceps: Vec<_> = sp.iter().map(|a| a.cep.as_str()).collect();
        assert_eq!(ceps, vec!["01001000", "01310100"]);

        let page = repo
            .list(CepFilter {
                limit: 1,
                offset: 2,
                ..CepFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page[0].cep, "20040002");
    }
}
