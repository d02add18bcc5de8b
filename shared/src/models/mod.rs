//! Domain models for BrickWorks Manager
//!
//! Every persisted record carries a `factory_id`; the factory is the tenant
//! boundary and nothing is read or written outside of it.

mod directory;
mod expense;
mod factory;
mod material;
mod payroll;
mod production;
mod rate;
mod sale;
mod user;

pub use directory::*;
pub use expense::*;
pub use factory::*;
pub use material::*;
pub use payroll::*;
pub use production::*;
pub use rate::*;
pub use sale::*;
pub use user::*;
