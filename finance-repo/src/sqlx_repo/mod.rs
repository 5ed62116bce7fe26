mod token_repo;
mod transaction_repo;
mod user_repo;

use crate::token_repo::TokenRepo;
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

pub struct SQLxRepo {
    pool: Pool<Postgres>,
}

impl SQLxRepo {
    pub fn new(pool: Pool<Postgres>) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

/// Connects to the database, applies pending migrations and returns the repos sharing one pool.
pub async fn create_repos(
    database_url: String,
    max_pool_size: u32,
) -> Result<
    (
        Arc<dyn UserRepo>,
        Arc<dyn TransactionRepo>,
        Arc<dyn TokenRepo>,
    ),
    anyhow::Error,
> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(&database_url)
        .await
        .context("Unable to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Unable to run migrations")?;

    let repo = Arc::new(SQLxRepo::new(pool));
    Ok((repo.clone(), repo.clone(), repo))
}
