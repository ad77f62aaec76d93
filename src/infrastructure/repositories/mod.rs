//! Repository implementations using SeaORM

pub mod profile_changes;
pub mod user_repository;

pub use profile_changes::ProfileChanges;
pub use user_repository::SeaOrmUserRepository;
