//! Core business logic for arcana.

pub mod services;

pub use services::*;
