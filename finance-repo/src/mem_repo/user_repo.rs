use super::MemRepo;
use crate::user_repo::UserRepoError::{EmailAlreadyExists, UserNotFound};
use crate::user_repo::{NewUser, User, UserId, UserRepo, UserRepoError, UserUpdate};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl UserRepo for MemRepo {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UserNotFound(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError> {
        let read_guard = self.read_lock()?;

        Ok(read_guard
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError> {
        let read_guard = self.read_lock()?;

        Ok(read_guard.users.values().cloned().collect())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.values().any(|u| u.email == new_user.email) {
            return Err(EmailAlreadyExists(new_user.email));
        }

        let id = write_guard.next_user_id;
        write_guard.next_user_id += 1;

        let now = Utc::now();
        let user = User {
            id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            admin: new_user.admin,
            created_at: now,
            updated_at: now,
        };
        write_guard.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: UserId,
        update: UserUpdate,
    ) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard
            .users
            .values()
            .any(|u| u.id != user_id && u.email == update.email)
        {
            return Err(EmailAlreadyExists(update.email));
        }

        let Some(user) = write_guard.users.get_mut(&user_id) else {
            return Err(UserNotFound(user_id));
        };
        user.name = update.name;
        user.email = update.email;
        user.admin = update.admin;
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.remove(&user_id).is_none() {
            return Err(UserNotFound(user_id));
        }
        write_guard.transactions.retain(|_, t| t.user_id != user_id);
        write_guard.tokens.retain(|_, t| t.user_id != user_id);

        Ok(())
    }
}
