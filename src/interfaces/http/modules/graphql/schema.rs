use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, FieldResult, Object, Schema, SimpleObject};

use crate::application::CepService;
use crate::domain::{Address, CepFilter};

pub type ToolsSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// GraphQL context
pub struct GraphQLContext {
    pub ceps: Arc<CepService>,
}

pub fn create_schema(ceps: Arc<CepService>) -> ToolsSchema {
    Schema::build(Query, EmptyMutation, EmptySubscription)
        .data(GraphQLContext { ceps })
        .finish()
}

#[derive(SimpleObject)]
#[graphql(name = "Address")]
pub struct AddressObject {
    pub cep: String,
    pub logradouro: String,
    pub complemento: String,
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
    pub ibge: String,
    pub ddd: String,
}

impl From<Address> for AddressObject {
    fn from(a: Address) -> Self {
        Self {
            cep: a.cep,
            logradouro: a.logradouro,
            complemento: a.complemento,
            bairro: a.bairro,
            localidade: a.localidade,
            uf: a.uf,
            ibge: a.ibge,
            ddd: a.ddd,
        }
    }
}

pub struct Query;

#[Object]
impl Query {
    /// Resolve one CEP (cache first, then the remote directory)
    async fn cep(&self, ctx: &Context<'_>, cep: String) -> FieldResult<Option<AddressObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let Some(cep) = crate::domain::cep::parse_cep(&cep) else {
            return Err(async_graphql::Error::new("CEP inválido."));
        };
        let address = context
            .ceps
            .resolve(&cep)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(address.map(Into::into))
    }

    /// Stored addresses ordered by CEP
    async fn ceps(
        &self,
        ctx: &Context<'_>,
        uf: Option<String>,
        localidade: Option<String>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> FieldResult<Vec<AddressObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let filter = CepFilter {
            uf,
            localidade,
            limit: limit.unwrap_or(0).max(0) as u64,
            offset: offset.unwrap_or(0).max(0) as u64,
        };
        let addresses = context
            .ceps
            .list(filter)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(addresses.into_iter().map(Into::into).collect())
    }
}
