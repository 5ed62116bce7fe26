use crate::sqlx_repo::SQLxRepo;
use crate::user_repo::{NewUser, User, UserId, UserRepo, UserRepoError, UserUpdate};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserEntry> for User {
    fn from(value: UserEntry) -> Self {
        User {
            id: value.id,
            name: value.name,
            email: value.email,
            password_hash: value.password_hash,
            admin: value.admin,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl UserRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get user {}", user_id))?;
        user.map(User::from)
            .ok_or(UserRepoError::UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError> {
        let user: Option<UserEntry> = query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Unable to get user by email")?;
        Ok(user.map(User::from))
    }

    #[instrument(skip(self))]
    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError> {
        let users: Vec<UserEntry> = query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Unable to get users")?;
        Ok(users.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as(
            "INSERT INTO users(name, email, password_hash, admin) VALUES($1, $2, $3, $4) ON CONFLICT (email) DO NOTHING RETURNING *",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.admin)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create user {}", new_user.email))?;
        user.map(User::from)
            .ok_or(UserRepoError::EmailAlreadyExists(new_user.email))
    }

    #[instrument(skip(self, update))]
    async fn update_user(
        &self,
        user_id: UserId,
        update: UserUpdate,
    ) -> Result<User, UserRepoError> {
        let result: Result<Option<UserEntry>, sqlx::Error> = query_as(
            "UPDATE users SET name = $1, email = $2, admin = $3, updated_at = NOW() WHERE id = $4 RETURNING *",
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.admin)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(user)) => Ok(user.into()),
            Ok(None) => Err(UserRepoError::UserNotFound(user_id)),
            Err(e) if is_unique_violation(&e) => Err(UserRepoError::EmailAlreadyExists(update.email)),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Unable to update user {}", user_id))
                .into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        query("DELETE FROM transactions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete transactions of user {}", user_id))?;
        query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete tokens of user {}", user_id))?;
        let result = query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete user {}", user_id))?;

        if result.rows_affected() != 1 {
            // dropping the transaction rolls it back
            return Err(UserRepoError::UserNotFound(user_id));
        }

        tx.commit().await.context("Unable to commit user deletion")?;
        Ok(())
    }
}
