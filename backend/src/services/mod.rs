//! Business logic services for the dairy herd management backend

pub mod animal;
pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod expense;
pub mod milk;
pub mod sale;
pub mod stock;
pub mod tenant;
pub mod worker;

pub use animal::AnimalService;
pub use auth::AuthService;
pub use customer::CustomerService;
pub use dashboard::DashboardService;
pub use expense::ExpenseService;
pub use milk::MilkRecordService;
pub use sale::MilkSaleService;
pub use stock::StockService;
pub use tenant::TenantResolver;
pub use worker::WorkerService;
