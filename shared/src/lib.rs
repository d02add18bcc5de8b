//! Shared types and ledger computations for BrickWorks Manager
//!
//! This crate contains the domain models and the pure ledger logic shared
//! between the backend, the browser (via WASM), and tests. Nothing in here
//! performs I/O.

pub mod format;
pub mod ledger;
pub mod models;
pub mod types;
pub mod validation;

pub use format::*;
pub use ledger::*;
pub use models::*;
pub use types::*;
pub use validation::*;
