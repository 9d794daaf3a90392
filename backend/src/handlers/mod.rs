//! HTTP request handlers

pub mod animal;
pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod expense;
pub mod health;
pub mod milk;
pub mod sale;
pub mod worker;

pub use animal::*;
pub use auth::*;
pub use customer::*;
pub use dashboard::*;
pub use expense::*;
pub use health::*;
pub use milk::*;
pub use sale::*;
pub use worker::*;
