//! Account lifecycle
//!
//! Contains the `AccountService` which orchestrates registration,
//! authentication and e-mail activation.

pub mod service;

pub use service::AccountService;
