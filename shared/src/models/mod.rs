//! Domain models for the Dairy Herd Management Platform

mod animal;
mod sale;

pub use animal::*;
pub use sale::*;
