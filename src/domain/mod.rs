//! Domain layer - Pure business abstractions
//!
//! This layer contains NO query construction. Only trait definitions,
//! record types and domain error types.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
