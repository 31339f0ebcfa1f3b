//! ViaCEP (`https://viacep.com.br`) client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

use crate::domain::{Address, CepGateway, DomainError, DomainResult, InfraError};

/// Wire shape of `/ws/{cep}/json/`. Misses come back as `{"erro": true}`
/// (older deployments send the string `"true"`).
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    complemento: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default)]
    ibge: String,
    #[serde(default)]
    ddd: String,
}

impl ViaCepResponse {
    fn is_miss(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag == "true",
            _ => false,
        }
    }

    fn into_address(self, requested: &str) -> Address {
        let digits: String = self.cep.chars().filter(char::is_ascii_digit).collect();
        Address {
            cep: if digits.len() == 8 {
                digits
            } else {
                requested.to_string()
            },
            logradouro: self.logradouro,
            complemento: self.complemento,
            bairro: self.bairro,
            localidade: self.localidade,
            uf: self.uf,
            ibge: self.ibge,
            ddd: self.ddd,
        }
    }
}

#[derive(Clone)]
pub struct ViaCepGateway {
    client: Client,
    base_url: String,
}

impl ViaCepGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl CepGateway for ViaCepGateway {
    async fn fetch(&self, cep: &str) -> DomainResult<Option<Address>> {
        let url = format!("{}/ws/{}/json/", self.base_url, cep);
        debug!(%url, "Querying ViaCEP");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(InfraError::from)?;

        // ViaCEP answers 400 for malformed CEPs
        if response.status() == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            error!(%status, cep, "ViaCEP error");
            return Err(DomainError::Upstream(format!("ViaCEP HTTP error: {}", status)));
        }

        let body: ViaCepResponse = response.json().await.map_err(InfraError::from)?;
        if body.is_miss() {
            return Ok(None);
        }
        Ok(Some(body.into_address(cep)))
    }
}
