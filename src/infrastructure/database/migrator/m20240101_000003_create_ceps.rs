//! Create ceps table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ceps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ceps::Cep)
                            .string_len(8)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ceps::Logradouro).string().not_null().default(""))
                    .col(ColumnDef::new(Ceps::Complemento).string().not_null().default(""))
                    .col(ColumnDef::new(Ceps::Bairro).string().not_null().default(""))
                    .col(ColumnDef::new(Ceps::Localidade).string().not_null())
                    .col(ColumnDef::new(Ceps::Uf).string_len(2).not_null())
                    .col(ColumnDef::new(Ceps::Ibge).string_len(10).not_null().default(""))
                    .col(ColumnDef::new(Ceps::Ddd).string_len(3).not_null().default(""))
                    .col(
                        ColumnDef::new(Ceps::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ceps_uf_localidade")
                    .table(Ceps::Table)
                    .col(Ceps::Uf)
                    .col(Ceps::Localidade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ceps::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Ceps {
    Table,
    Cep,
    Logradouro,
    Complemento,
    Bairro,
    Localidade,
    Uf,
    Ibge,
    Ddd,
    UpdatedAt,
}
