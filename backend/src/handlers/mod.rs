//! HTTP handlers

pub mod admin;
pub mod auth;
pub mod directory;
pub mod expense;
pub mod factory;
pub mod health;
pub mod material;
pub mod payroll;
pub mod production;
pub mod rate;
pub mod reporting;
pub mod sale;

pub use admin::*;
pub use auth::*;
pub use directory::*;
pub use expense::*;
pub use factory::*;
pub use health::*;
pub use material::*;
pub use payroll::*;
pub use production::*;
pub use rate::*;
pub use reporting::*;
pub use sale::*;
