//! Services Layer
//!
//! Business rules that sit above the repositories and below any transport.

pub mod user_service;

// Re-export for convenience
pub use user_service::*;
