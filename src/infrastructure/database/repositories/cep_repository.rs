use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::{Address, CepFilter, CepRepository, DomainError, DomainResult, InfraError};
use crate::infrastructure::database::entities::cep;
use crate::shared::SharedClock;

pub struct SeaOrmCepRepository {
    db: DatabaseConnection,
    clock: SharedClock,
}

impl SeaOrmCepRepository {
    pub fn new(db: DatabaseConnection, clock: SharedClock) -> Self {
        Self { db, clock }
    }
}

fn model_to_domain(model: cep::Model) -> Address {
    Address {
        cep: model.cep,
        logradouro: model.logradouro,
        complemento: model.complemento,
        bairro: model.bairro,
        localidade: model.localidade,
        uf: model.uf,
        ibge: model.ibge,
        ddd: model.ddd,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

#[async_trait]
impl CepRepository for SeaOrmCepRepository {
    async fn find(&self, cep: &str) -> DomainResult<Option<Address>> {
        let model = cep::Entity::find_by_id(cep.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn save(&self, address: &Address) -> DomainResult<()> {
        let row = cep::ActiveModel {
            cep: Set(address.cep.clone()),
            logradouro: Set(address.logradouro.clone()),
            complemento: Set(address.complemento.clone()),
            bairro: Set(address.bairro.clone()),
            localidade: Set(address.localidade.clone()),
            uf: Set(address.uf.clone()),
            ibge: Set(address.ibge.clone()),
            ddd: Set(address.ddd.clone()),
            updated_at: Set(self.clock.now()),
        };

        cep::Entity::insert(row)
            .on_conflict(
                OnConflict::column(cep::Column::Cep)
                    .update_columns([
                        cep::Column::Logradouro,
                        cep::Column::Complemento,
                        cep::Column::Bairro,
                        cep::Column::Localidade,
                        cep::Column::Uf,
                        cep::Column::Ibge,
                        cep::Column::Ddd,
                        cep::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn list(&self, filter: CepFilter) -> DomainResult<Vec<Address>> {
        let mut query = cep::Entity::find();

        if let Some(ref uf) = filter.uf {
            query = query.filter(cep::Column::Uf.eq(uf.to_uppercase()));
        }
        if let Some(ref localidade) = filter.localidade {
            query = query.filter(cep::Column::Localidade.eq(localidade.as_str()));
        }

        let models = query
            .order_by_asc(cep::Column::Cep)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
