//! Mock implementations for testing.
//!
//! Collaborators with controllable behaviour, so failure paths of the
//! registry can be exercised without a real token or whitelist contract.

pub mod token;
pub mod whitelist;

pub use token::{FailureSwitch, MockToken, MockTokenFailure};
pub use whitelist::MockWhitelist;
