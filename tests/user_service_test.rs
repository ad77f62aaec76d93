use std::sync::Arc;

use async_trait::async_trait;
use userbase::db;
use userbase::domain::{
    ActivityAggregate, CreatedUser, DomainError, FollowEdge, FollowerPage, NewUser,
    ProfileRecord, ProfileUpdate, UpdatedProfile, UserPage, UserRecord, UserRepository,
};
use userbase::infrastructure::AppState;
use userbase::seed;
use userbase::services::{LoginRequest, ResetPasswordRequest, UserService};

// Helper to create a service over a fresh in-memory store
async fn setup_service() -> UserService {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db).user_service()
}

fn new_user(username: &str, password: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: password.to_string(),
        full_name: format!("{} Tester", username),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_accepts_matching_credential() {
    let service = setup_service().await;
    let created = service.register(new_user("alice", "s3cret")).await.unwrap();

    let user = service
        .login(login("alice@example.com", "s3cret"))
        .await
        .expect("login failed");
    assert_eq!(user.id, created.id);
}

#[tokio::test]
async fn test_login_rejects_wrong_credential() {
    let service = setup_service().await;
    service.register(new_user("alice", "s3cret")).await.unwrap();

    assert_eq!(
        service.login(login("alice@example.com", "wrong")).await,
        Err(DomainError::Unauthenticated)
    );
    // Byte equality, no case folding or trimming
    assert_eq!(
        service.login(login("alice@example.com", "S3cret")).await,
        Err(DomainError::Unauthenticated)
    );
}

#[tokio::test]
async fn test_login_unknown_email_looks_like_wrong_password() {
    let service = setup_service().await;

    assert_eq!(
        service.login(login("nobody@example.com", "x")).await,
        Err(DomainError::Unauthenticated)
    );
}

#[tokio::test]
async fn test_deleted_user_cannot_login() {
    let service = setup_service().await;
    let created = service.register(new_user("alice", "s3cret")).await.unwrap();
    service.delete_user(&created.id).await.unwrap();

    assert_eq!(
        service.login(login("alice@example.com", "s3cret")).await,
        Err(DomainError::Unauthenticated)
    );
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let service = setup_service().await;

    let result = service.register(new_user("", "pw")).await;
    assert!(matches!(result, Err(DomainError::InvalidArgument(_))));

    let result = service.register(new_user("alice", "")).await;
    assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_reset_password_requires_old_password() {
    let service = setup_service().await;
    let created = service.register(new_user("alice", "old")).await.unwrap();

    let result = service
        .reset_password(
            &created.id,
            ResetPasswordRequest {
                old_password: "guess".to_string(),
                new_password: "new".to_string(),
            },
        )
        .await;
    assert_eq!(result, Err(DomainError::Unauthenticated));

    // Nothing was written
    assert!(service.login(login("alice@example.com", "old")).await.is_ok());
}

#[tokio::test]
async fn test_reset_password_replaces_credential() {
    let service = setup_service().await;
    let created = service.register(new_user("alice", "old")).await.unwrap();

    service
        .reset_password(
            &created.id,
            ResetPasswordRequest {
                old_password: "old".to_string(),
                new_password: "new".to_string(),
            },
        )
        .await
        .expect("reset failed");

    assert!(service.login(login("alice@example.com", "new")).await.is_ok());
    assert_eq!(
        service.login(login("alice@example.com", "old")).await,
        Err(DomainError::Unauthenticated)
    );
}

#[tokio::test]
async fn test_profile_and_update_use_caller_identity() {
    let service = setup_service().await;
    let me = service.register(new_user("me", "pw")).await.unwrap();
    let them = service.register(new_user("them", "pw")).await.unwrap();

    let updated = service
        .update_profile(
            &me.id,
            ProfileUpdate {
                bio: Some("Hello".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, me.id);

    assert_eq!(service.profile(&me.id).await.unwrap().bio, "Hello");
    assert_eq!(service.profile(&them.id).await.unwrap().bio, "");
}

#[tokio::test]
async fn test_follow_and_followers_through_service() {
    let service = setup_service().await;
    let star = service.register(new_user("star", "pw")).await.unwrap();
    let fan = service.register(new_user("fan", "pw")).await.unwrap();

    let edge = service.follow(&fan.id, &star.id).await.unwrap();
    assert_eq!(edge.follower_id, fan.id);

    let page = service.followers(&star.id, 10, 0).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.followers[0].username, "fan");

    assert!(matches!(
        service.follow(&fan.id, &star.id).await,
        Err(DomainError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_seeded_demo_graph() {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    seed::seed_demo_data(&db).await.expect("seed failed");
    // Seeding is repeatable
    seed::seed_demo_data(&db).await.expect("reseed failed");

    let service = AppState::new(db).user_service();
    let alice = service
        .login(login("alice@example.com", "demo"))
        .await
        .expect("demo login failed");

    let followers = service.followers(&alice.id, 0, 0).await.unwrap();
    let names: Vec<_> = followers.followers.iter().map(|f| f.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "carol"]);

    let activity = service.activity(&alice.id).await.unwrap();
    assert_eq!(activity.stories_count, 2);
    assert_eq!(activity.comments_count, 5);
    assert_eq!(activity.likes_received, 25);

    assert_eq!(service.list_users(0, 0).await.unwrap().total, 3);
}

/// Repository whose store is always down
struct UnavailableRepository;

fn down<T>() -> Result<T, DomainError> {
    Err(DomainError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl UserRepository for UnavailableRepository {
    async fn create_user(&self, _user: NewUser) -> Result<CreatedUser, DomainError> {
        down()
    }
    async fn get_user_by_id(&self, _id: &str) -> Result<UserRecord, DomainError> {
        down()
    }
    async fn get_user_by_email(&self, _email: &str) -> Result<UserRecord, DomainError> {
        down()
    }
    async fn get_user_profile(&self, _id: &str) -> Result<ProfileRecord, DomainError> {
        down()
    }
    async fn update_user(
        &self,
        _id: &str,
        _update: ProfileUpdate,
    ) -> Result<UpdatedProfile, DomainError> {
        down()
    }
    async fn get_users(&self, _limit: u64, _offset: u64) -> Result<UserPage, DomainError> {
        down()
    }
    async fn delete_user(&self, _id: &str) -> Result<(), DomainError> {
        down()
    }
    async fn update_password(&self, _id: &str, _new_password: &str) -> Result<(), DomainError> {
        down()
    }
    async fn get_user_activity(&self, _user_id: &str) -> Result<ActivityAggregate, DomainError> {
        down()
    }
    async fn follow(
        &self,
        _follower_id: &str,
        _following_id: &str,
    ) -> Result<FollowEdge, DomainError> {
        down()
    }
    async fn get_followers(
        &self,
        _user_id: &str,
        _limit: u64,
        _offset: u64,
    ) -> Result<FollowerPage, DomainError> {
        down()
    }
}

#[tokio::test]
async fn test_transient_faults_are_not_narrowed_to_unauthenticated() {
    let service = UserService::new(Arc::new(UnavailableRepository));

    let result = service.login(login("alice@example.com", "pw")).await;
    assert!(matches!(result, Err(DomainError::Unavailable(_))));
    assert!(result.unwrap_err().is_transient());

    let result = service
        .reset_password(
            "id",
            ResetPasswordRequest {
                old_password: "a".to_string(),
                new_password: "b".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::Unavailable(_))));

    // Followers errors propagate instead of yielding a partial page
    assert!(service.followers("id", 10, 0).await.is_err());
}
