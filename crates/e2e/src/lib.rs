//! Storefront business-flow runner.
//!
//! Each flow performs one user-facing journey (signup, login, cart mutation,
//! checkout) against a live storefront session and asserts on the outcome
//! the synchronization core resolves for it.

pub mod flows;
pub mod report;

pub use report::{FlowRecord, FlowReport};
