pub mod follower;
pub mod story;
pub mod user;
