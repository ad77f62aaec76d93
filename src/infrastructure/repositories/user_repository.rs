//! SeaORM implementation of UserRepository
//!
//! Each method is one logical operation against the store. The only
//! read-after-write pair is `update_user`, which re-reads the row it touched;
//! the two round trips are not wrapped in a transaction, so a concurrent
//! soft delete in between surfaces as `NotFound`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::sea_query::{Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, Set,
};
use uuid::Uuid;

use super::ProfileChanges;
use crate::domain::{
    ActivityAggregate, CreatedUser, DomainError, FollowEdge, FollowerPage, FollowerSummary,
    NewUser, ProfileRecord, ProfileUpdate, UpdatedProfile, UserPage, UserRecord, UserRepository,
    UserSummary,
};
use crate::models::follower::{self, Entity as FollowerEntity};
use crate::models::story;
use crate::models::user::{self, ActiveModel, Column, Entity as UserEntity};

/// SQLite rejects OFFSET without LIMIT, so an unbounded page still carries one.
const UNBOUNDED: u64 = i64::MAX as u64;

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn live_users() -> Select<UserEntity> {
    UserEntity::find().filter(Column::DeletedAt.eq(0))
}

fn live_user(id: &str) -> Select<UserEntity> {
    live_users().filter(Column::Id.eq(id))
}

/// `SELECT 1 FROM users WHERE id = ? AND deleted_at = 0`
fn live_user_exists(id: &str) -> SelectStatement {
    Query::select()
        .expr(Expr::val(1))
        .from(UserEntity)
        .and_where(Expr::col(Column::Id).eq(id))
        .and_where(Expr::col(Column::DeletedAt).eq(0))
        .to_owned()
}

// The driver binds LIMIT/OFFSET as signed 64-bit integers
fn window<Q: QuerySelect>(query: Q, limit: u64, offset: u64) -> Q {
    let (limit, offset) = (limit.min(UNBOUNDED), offset.min(UNBOUNDED));
    let query = match (limit, offset) {
        (0, 0) => query,
        (0, _) => query.limit(UNBOUNDED),
        (limit, _) => query.limit(limit),
    };

    if offset > 0 { query.offset(offset) } else { query }
}

impl From<user::Model> for UserRecord {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password: model.password,
            full_name: model.full_name,
            bio: model.bio.unwrap_or_default(),
            countries_visited: model.countries_visited,
        }
    }
}

impl From<user::Model> for ProfileRecord {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            bio: model.bio.unwrap_or_default(),
            countries_visited: model.countries_visited,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<user::Model> for UpdatedProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            bio: model.bio.unwrap_or_default(),
            countries_visited: model.countries_visited,
            updated_at: model.updated_at,
        }
    }
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            countries_visited: model.countries_visited,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct ActivityRow {
    user_id: String,
    stories_count: i64,
    comments_count: i64,
    likes_received: i64,
    countries_visited: i32,
    last_activity: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct FollowerRow {
    id: String,
    username: String,
    full_name: String,
    followed_at: String,
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<CreatedUser, DomainError> {
        let now = now_timestamp();

        let new_user = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(input.username),
            email: Set(input.email),
            password: Set(input.password),
            full_name: Set(input.full_name),
            bio: Set(None),
            countries_visited: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            deleted_at: Set(0),
        };

        let result = new_user.insert(&self.db).await?;

        Ok(CreatedUser {
            id: result.id,
            username: result.username,
            email: result.email,
            full_name: result.full_name,
            created_at: result.created_at,
        })
    }

    async fn get_user_by_id(&self, id: &str) -> Result<UserRecord, DomainError> {
        let user = live_user(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        Ok(UserRecord::from(user))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, DomainError> {
        let user = live_users()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        Ok(UserRecord::from(user))
    }

    async fn get_user_profile(&self, id: &str) -> Result<ProfileRecord, DomainError> {
        let user = live_user(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        Ok(ProfileRecord::from(user))
    }

    async fn update_user(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<UpdatedProfile, DomainError> {
        let result = ProfileChanges::from_update(&update)
            .into_update(id, now_timestamp())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        // Second round trip: a delete landing in between is reported, not hidden
        let user = live_user(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        Ok(UpdatedProfile::from(user))
    }

    async fn get_users(&self, limit: u64, offset: u64) -> Result<UserPage, DomainError> {
        // Counted over the whole live set; the page length depends on the window
        let total = live_users().count(&self.db).await?;

        let page = window(
            live_users()
                .order_by_asc(Column::Username)
                .order_by_asc(Column::Id),
            limit,
            offset,
        )
        .all(&self.db)
        .await?;

        Ok(UserPage {
            users: page.into_iter().map(UserSummary::from).collect(),
            total,
            limit,
            offset,
        })
    }

    async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        let now = Utc::now();

        let result = UserEntity::update_many()
            .col_expr(Column::DeletedAt, Expr::value(now.timestamp()))
            .col_expr(Column::UpdatedAt, Expr::value(format_timestamp(now)))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.eq(0))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }

    async fn update_password(&self, id: &str, new_password: &str) -> Result<(), DomainError> {
        let result = UserEntity::update_many()
            .col_expr(Column::Password, Expr::value(new_password))
            .col_expr(Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.eq(0))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }

    async fn get_user_activity(&self, user_id: &str) -> Result<ActivityAggregate, DomainError> {
        let story_col = |column: story::Column| Expr::col((story::Entity, column));

        // Latest of created_at/updated_at per story; NULL for the empty join side
        let touched_at = Expr::case(
            story_col(story::Column::UpdatedAt).gt(story_col(story::Column::CreatedAt)),
            story_col(story::Column::UpdatedAt),
        )
        .finally(story_col(story::Column::CreatedAt));

        let sum_or_zero = |column: story::Column| {
            SimpleExpr::from(Func::coalesce([
                SimpleExpr::from(Func::sum(story_col(column))),
                SimpleExpr::from(Expr::val(0)),
            ]))
        };

        let row = live_user(user_id)
            .select_only()
            .column_as(Column::Id, "user_id")
            .column(Column::CountriesVisited)
            .column_as(
                SimpleExpr::from(Func::count(story_col(story::Column::Id))),
                "stories_count",
            )
            .column_as(sum_or_zero(story::Column::CommentsCount), "comments_count")
            .column_as(sum_or_zero(story::Column::LikesCount), "likes_received")
            .column_as(SimpleExpr::from(Func::max(touched_at)), "last_activity")
            .join(JoinType::LeftJoin, user::Relation::Story.def())
            .group_by(Column::Id)
            .group_by(Column::CountriesVisited)
            .into_model::<ActivityRow>()
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        Ok(ActivityAggregate {
            user_id: row.user_id,
            stories_count: row.stories_count,
            comments_count: row.comments_count,
            likes_received: row.likes_received,
            countries_visited: row.countries_visited,
            last_activity: row.last_activity,
        })
    }

    async fn follow(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<FollowEdge, DomainError> {
        // INSERT ... SELECT guarded by both users being live, in one statement.
        // `followed_at` comes from the column default and is read back.
        let guarded = Query::select()
            .exprs([Expr::val(follower_id), Expr::val(following_id)])
            .and_where(Expr::exists(live_user_exists(follower_id)))
            .and_where(Expr::exists(live_user_exists(following_id)))
            .to_owned();

        let insert = Query::insert()
            .into_table(FollowerEntity)
            .columns([follower::Column::FollowerId, follower::Column::FollowingId])
            .select_from(guarded)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .returning_col(follower::Column::FollowedAt)
            .to_owned();

        let backend = self.db.get_database_backend();
        let row = self
            .db
            .query_one(backend.build(&insert))
            .await?
            .ok_or(DomainError::NotFound)?;
        let followed_at: String = row.try_get("", "followed_at")?;

        Ok(FollowEdge {
            follower_id: follower_id.to_owned(),
            following_id: following_id.to_owned(),
            followed_at,
        })
    }

    async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<FollowerPage, DomainError> {
        // Live users with an edge pointing at a live `user_id`
        let followers_of = || {
            live_users()
                .join(JoinType::InnerJoin, follower::Relation::Follower.def().rev())
                .filter(follower::Column::FollowingId.eq(user_id))
                .filter(
                    follower::Column::FollowingId.in_subquery(
                        Query::select()
                            .column(Column::Id)
                            .from(UserEntity)
                            .and_where(Expr::col(Column::Id).eq(user_id))
                            .and_where(Expr::col(Column::DeletedAt).eq(0))
                            .to_owned(),
                    ),
                )
        };

        let rows = window(
            followers_of()
                .select_only()
                .column(Column::Id)
                .column(Column::Username)
                .column(Column::FullName)
                .column_as(follower::Column::FollowedAt, "followed_at")
                .order_by_asc(Column::Username)
                .order_by_asc(Column::Id),
            limit,
            offset,
        )
        .into_model::<FollowerRow>()
        .all(&self.db)
        .await?;

        // The page is windowed, so the total needs its own query
        let total = followers_of().count(&self.db).await?;

        Ok(FollowerPage {
            followers: rows
                .into_iter()
                .map(|row| FollowerSummary {
                    id: row.id,
                    username: row.username,
                    full_name: row.full_name,
                    followed_at: row.followed_at,
                })
                .collect(),
            total,
            limit,
            offset,
        })
    }
}
