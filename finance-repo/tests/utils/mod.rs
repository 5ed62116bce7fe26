pub mod generator;
pub mod test_user;

use finance_repo::token_repo::TokenRepo;
use finance_repo::transaction_repo::TransactionRepo;
use finance_repo::user_repo::UserRepo;
use std::env;
use std::sync::Arc;

/// `SQLx` cases are ignored by default. Run them with
/// `FINANCE_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.
#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

pub async fn build_repos(
    repo_type: RepoType,
) -> (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn TokenRepo>,
) {
    match repo_type {
        RepoType::SQLx => {
            let database_url = env::var("FINANCE_TEST_DATABASE_URL")
                .expect("FINANCE_TEST_DATABASE_URL must be set for database tests");
            finance_repo::sqlx_repo::create_repos(database_url, 1)
                .await
                .unwrap()
        }
        RepoType::Mem => finance_repo::mem_repo::create_repos(),
    }
}
