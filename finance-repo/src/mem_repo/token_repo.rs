use super::{MemRepo, State};
use crate::token_repo::TokenRepoError::TokenNotFound;
use crate::token_repo::{AuthToken, TokenRepo, TokenRepoError};
use crate::user_repo::UserId;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;

fn insert_token(
    state: &mut State,
    user_id: UserId,
    token_id: &str,
) -> Result<AuthToken, TokenRepoError> {
    if !state.users.contains_key(&user_id) {
        return Err(anyhow!("User {} does not exist", user_id).into());
    }
    let token = AuthToken {
        id: token_id.to_owned(),
        user_id,
        created_at: Utc::now(),
    };
    state.tokens.insert(token.id.clone(), token.clone());
    Ok(token)
}

#[async_trait]
impl TokenRepo for MemRepo {
    async fn get_token(&self, token_id: &str) -> Result<AuthToken, TokenRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .tokens
            .get(token_id)
            .cloned()
            .ok_or_else(|| TokenNotFound(token_id.to_owned()))
    }

    async fn create_token(
        &self,
        user_id: UserId,
        token_id: &str,
    ) -> Result<AuthToken, TokenRepoError> {
        let mut write_guard = self.write_lock()?;

        insert_token(&mut write_guard, user_id, token_id)
    }

    async fn replace_tokens(
        &self,
        user_id: UserId,
        token_id: &str,
    ) -> Result<AuthToken, TokenRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard.tokens.retain(|_, t| t.user_id != user_id);
        insert_token(&mut write_guard, user_id, token_id)
    }

    async fn revoke_tokens(&self, user_id: UserId) -> Result<u64, TokenRepoError> {
        let mut write_guard = self.write_lock()?;

        let before = write_guard.tokens.len();
        write_guard.tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - write_guard.tokens.len()) as u64)
    }
}
