//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::UserRepository;
use crate::infrastructure::SeaOrmUserRepository;
use crate::services::UserService;

/// State shared by whatever transport sits in front of the core
#[derive(Clone)]
pub struct AppState {
    /// User repository
    pub user_repo: Arc<dyn UserRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(SeaOrmUserRepository::new(db));

        Self { user_repo }
    }

    /// Service bound to this state's repository
    pub fn user_service(&self) -> UserService {
        UserService::new(self.user_repo.clone())
    }
}
