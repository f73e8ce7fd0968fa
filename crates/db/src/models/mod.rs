//! Row models and DTOs, one module per table.

pub mod audit;
pub mod document;
pub mod user;
