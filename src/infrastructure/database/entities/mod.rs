//! Database entities module

pub mod account;
pub mod cep;
pub mod confirmation_code;

pub use account::Entity as Account;
pub use cep::Entity as Cep;
pub use confirmation_code::Entity as ConfirmationCode;
