use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type UserId = i64;

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError>;

    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError>;

    async fn update_user(&self, user_id: UserId, update: UserUpdate)
        -> Result<User, UserRepoError>;

    /// Deletes the user together with all of their transactions and tokens.
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError>;
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User {0} not found")]
    UserNotFound(UserId),
    #[error("A user with email {0} already exists")]
    EmailAlreadyExists(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub admin: bool,
}

impl NewUser {
    pub fn new(name: String, email: String, password_hash: String) -> NewUser {
        NewUser {
            name,
            email,
            password_hash,
            admin: false,
        }
    }
}

/// The fields of a user that can be changed after registration.
#[derive(Clone, Debug)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub admin: bool,
}
