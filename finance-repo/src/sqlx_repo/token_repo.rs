use crate::sqlx_repo::SQLxRepo;
use crate::token_repo::{AuthToken, TokenRepo, TokenRepoError};
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, Executor, Postgres};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TokenEntry {
    id: String,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl From<TokenEntry> for AuthToken {
    fn from(value: TokenEntry) -> Self {
        AuthToken {
            id: value.id,
            user_id: value.user_id,
            created_at: value.created_at,
        }
    }
}

impl SQLxRepo {
    async fn insert_token_entry<'e, E>(
        db_executor: E,
        user_id: UserId,
        token_id: &str,
    ) -> Result<AuthToken, TokenRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let token: TokenEntry = query_as(
            "INSERT INTO auth_tokens(id, user_id) VALUES ($1, $2) RETURNING id, user_id, created_at",
        )
        .bind(token_id)
        .bind(user_id)
        .fetch_one(db_executor)
        .await
        .with_context(|| format!("Unable to create token for user {}", user_id))?;
        Ok(token.into())
    }
}

#[async_trait]
impl TokenRepo for SQLxRepo {
    #[instrument(skip(self, token_id))]
    async fn get_token(&self, token_id: &str) -> Result<AuthToken, TokenRepoError> {
        let token: Option<TokenEntry> =
            query_as("SELECT id, user_id, created_at FROM auth_tokens WHERE id = $1")
                .bind(token_id)
                .fetch_optional(&self.pool)
                .await
                .context("Unable to get token")?;
        token
            .map(AuthToken::from)
            .ok_or_else(|| TokenRepoError::TokenNotFound(token_id.to_owned()))
    }

    #[instrument(skip(self, token_id))]
    async fn create_token(
        &self,
        user_id: UserId,
        token_id: &str,
    ) -> Result<AuthToken, TokenRepoError> {
        Self::insert_token_entry(&self.pool, user_id, token_id).await
    }

    #[instrument(skip(self, token_id))]
    async fn replace_tokens(
        &self,
        user_id: UserId,
        token_id: &str,
    ) -> Result<AuthToken, TokenRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to revoke tokens of user {}", user_id))?;
        let token = Self::insert_token_entry(&mut *tx, user_id, token_id).await?;

        tx.commit().await.context("Unable to commit token replacement")?;
        Ok(token)
    }

    #[instrument(skip(self))]
    async fn revoke_tokens(&self, user_id: UserId) -> Result<u64, TokenRepoError> {
        let result = query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to revoke tokens of user {}", user_id))?;
        Ok(result.rows_affected())
    }
}
