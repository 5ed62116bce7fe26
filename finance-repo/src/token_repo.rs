use crate::user_repo::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[async_trait]
pub trait TokenRepo: Sync + Send {
    async fn get_token(&self, token_id: &str) -> Result<AuthToken, TokenRepoError>;

    async fn create_token(
        &self,
        user_id: UserId,
        token_id: &str,
    ) -> Result<AuthToken, TokenRepoError>;

    /// Revokes every token of the user and stores `token_id` as the only one left, atomically.
    async fn replace_tokens(
        &self,
        user_id: UserId,
        token_id: &str,
    ) -> Result<AuthToken, TokenRepoError>;

    /// Returns the number of revoked tokens.
    async fn revoke_tokens(&self, user_id: UserId) -> Result<u64, TokenRepoError>;
}

#[derive(Error, Debug)]
pub enum TokenRepoError {
    #[error("Token {0} not found")]
    TokenNotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Clone, PartialEq, Debug)]
pub struct AuthToken {
    pub id: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
