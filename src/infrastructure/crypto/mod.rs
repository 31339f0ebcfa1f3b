//! Cryptographic primitives: JWT signing, password hashing, confirmation codes

pub mod confirmation;
pub mod jwt;
pub mod password;

pub use jwt::{issue_token, verify_token, JwtTokenIssuer, SigningKey, TokenClaims};
pub use password::{hash_password, verify_password};
