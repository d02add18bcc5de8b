//! Business logic services for BrickWorks Manager

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod directory;
pub mod expense;
pub mod factory;
pub mod material;
pub mod payroll;
pub mod production;
pub mod rate;
pub mod reporting;
pub mod sale;

pub use admin::AdminService;
pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use directory::DirectoryService;
pub use expense::ExpenseService;
pub use factory::FactoryService;
pub use material::MaterialService;
pub use payroll::PayrollService;
pub use production::ProductionService;
pub use rate::RateService;
pub use reporting::ReportingService;
pub use sale::SaleService;
