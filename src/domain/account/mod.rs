//! Account aggregate
//!
//! The Account entity, identity rules, and the credential store interface.

pub mod model;
pub mod policy;
pub mod store;

pub use model::{
    Account, ActivationRequest, Credentials, IdentityError, IdentityErrorCode, NewAccount,
    SignInOutcome,
};
pub use policy::{
    normalize_key, saturating_after, validate_profile, IdentitySettings, LockoutPolicy,
    PasswordPolicy,
};
pub use store::CredentialStore;
