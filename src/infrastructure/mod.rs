//! Infrastructure layer - external concerns

pub mod cep;
pub mod crypto;
pub mod database;
pub mod email;
pub mod storage;

pub use cep::ViaCepGateway;
pub use database::{
    init_database, run_migrations, DatabaseConfig, SeaOrmCepRepository, SeaOrmCredentialStore,
};
pub use email::{
    InMemoryNotificationSender, LoggingNotificationSender, SmtpNotificationSender, SmtpSettings,
};
pub use storage::{InMemoryCepRepository, InMemoryCredentialStore};
