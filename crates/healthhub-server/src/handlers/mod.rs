//! Role-scoped request handlers.

pub mod admin;
pub mod exams;
pub mod health;
pub mod nursing;
pub mod patients;
pub mod pharmacy;
