//! Core entities, rules and capability traits

pub mod account;
pub mod cep;
pub mod error;
pub mod notification;
pub mod token;

pub use account::{
    Account, ActivationRequest, CredentialStore, Credentials, IdentityError, IdentityErrorCode,
    IdentitySettings, LockoutPolicy, NewAccount, PasswordPolicy, SignInOutcome,
};
pub use cep::{Address, CepFilter, CepGateway, CepRepository};
pub use error::{DomainError, DomainResult, InfraError};
pub use notification::NotificationSender;
pub use token::{AccessToken, TokenError, TokenIssuer, TokenSettings};
