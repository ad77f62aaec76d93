use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::models::{follower, story, user};

const ALICE: &str = "3f1c2a8e-5b0d-4e7a-9c61-0a2b4d6e8f10";
const BOB: &str = "7a9e4c21-1d3b-4f5a-8e07-b2c4d6e8f0a1";
const CAROL: &str = "c2d4e6f8-0a1b-4c3d-9e5f-7a8b9c0d1e2f";

/// Insert a small demo graph. Safe to run repeatedly.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true);

    // 1. Users
    let users = [
        (ALICE, "alice", "alice@example.com", "Alice Martin", Some("Travels light"), 12),
        (BOB, "bob", "bob@example.com", "Bob Nguyen", None, 3),
        (CAROL, "carol", "carol@example.com", "Carol Diaz", Some(""), 0),
    ];

    for (id, username, email, full_name, bio, countries) in users {
        let model = user::ActiveModel {
            id: Set(id.to_owned()),
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password: Set("demo".to_owned()),
            full_name: Set(full_name.to_owned()),
            bio: Set(bio.map(str::to_owned)),
            countries_visited: Set(countries),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            deleted_at: Set(0),
        };

        user::Entity::insert(model)
            .on_conflict(OnConflict::column(user::Column::Id).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 2. Follow edges: bob and carol follow alice, alice follows bob
    for (follower_id, following_id) in [(BOB, ALICE), (CAROL, ALICE), (ALICE, BOB)] {
        let edge = follower::ActiveModel {
            follower_id: Set(follower_id.to_owned()),
            following_id: Set(following_id.to_owned()),
            followed_at: Set(now.clone()),
        };

        follower::Entity::insert(edge)
            .on_conflict(
                OnConflict::columns([follower::Column::FollowerId, follower::Column::FollowingId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    // 3. Stories for alice
    let stories = [
        ("0b6f3a52-9d44-4c1e-8a37-5e2d1c0b9a81", "Crossing the Pamir", 4, 18),
        ("9e8d7c6b-5a49-4382-b1c0-d9e8f7a6b5c4", "Night train to Tbilisi", 1, 7),
    ];

    for (id, title, comments, likes) in stories {
        let model = story::ActiveModel {
            id: Set(id.to_owned()),
            author_id: Set(ALICE.to_owned()),
            title: Set(title.to_owned()),
            comments_count: Set(comments),
            likes_count: Set(likes),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
        };

        story::Entity::insert(model)
            .on_conflict(OnConflict::column(story::Column::Id).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    Ok(())
}
