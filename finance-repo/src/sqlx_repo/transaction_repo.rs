use crate::sqlx_repo::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionId, TransactionRepo, TransactionRepoError,
    TransactionType, TransactionUpdate,
};
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{query_as, query_scalar, QueryBuilder};
use tracing::instrument;

const TRANSACTION_COLUMNS: &str =
    "id, name, user_id, type, amount, date, description, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i64,
    name: String,
    user_id: i64,
    #[sqlx(rename = "type")]
    transaction_type: TransactionType,
    amount: Decimal,
    date: NaiveDate,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TransactionEntry> for Transaction {
    fn from(value: TransactionEntry) -> Self {
        Transaction {
            id: value.id,
            name: value.name,
            user_id: value.user_id,
            transaction_type: value.transaction_type,
            amount: value.amount,
            date: value.date,
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Transaction, TransactionRepoError> {
        let transaction_entry: Option<TransactionEntry> = query_as(&format!(
            "SELECT {} FROM transactions WHERE id = $1",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get transaction {}", transaction_id))?;
        transaction_entry
            .map(Transaction::from)
            .ok_or(TransactionNotFound(transaction_id))
    }

    #[instrument(skip(self))]
    async fn get_all_transactions(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let mut query_builder = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE user_id = ",
            TRANSACTION_COLUMNS
        ));
        query_builder.push_bind(user);
        if let Some(transaction_type) = filter.transaction_type {
            query_builder.push(" AND type = ").push_bind(transaction_type);
        }
        query_builder.push(" ORDER BY id");

        let transaction_entries: Vec<TransactionEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get transactions for user {}", user))?;
        Ok(transaction_entries
            .into_iter()
            .map(Transaction::from)
            .collect())
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_new_transaction(
        &self,
        user: UserId,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let transaction_entry: TransactionEntry = query_as(&format!(
            "INSERT INTO transactions(name, user_id, type, amount, date, description) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(new_transaction.name)
        .bind(user)
        .bind(new_transaction.transaction_type)
        .bind(new_transaction.amount)
        .bind(new_transaction.date)
        .bind(new_transaction.description)
        .fetch_one(&self.pool)
        .await
        .context("Unable to insert transaction")?;
        Ok(transaction_entry.into())
    }

    #[instrument(skip(self, update))]
    async fn update_transaction(
        &self,
        transaction_id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError> {
        let transaction_entry: Option<TransactionEntry> = query_as(&format!(
            "UPDATE transactions SET name = $1, type = $2, amount = $3, date = $4, description = COALESCE($5, description), updated_at = NOW() WHERE id = $6 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(update.name)
        .bind(update.transaction_type)
        .bind(update.amount)
        .bind(update.date)
        .bind(update.description)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to update transaction {}", transaction_id))?;
        transaction_entry
            .map(Transaction::from)
            .ok_or(TransactionNotFound(transaction_id))
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Transaction, TransactionRepoError> {
        let transaction_entry: Option<TransactionEntry> = query_as(&format!(
            "DELETE FROM transactions WHERE id = $1 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to delete transaction {}", transaction_id))?;
        transaction_entry
            .map(Transaction::from)
            .ok_or(TransactionNotFound(transaction_id))
    }

    #[instrument(skip(self))]
    async fn get_sum(&self, user: UserId, filter: Filter) -> Result<Decimal, TransactionRepoError> {
        let sum: Option<Decimal> = query_scalar(
            "SELECT SUM(amount) FROM transactions WHERE user_id = $1 AND ($2::transaction_type IS NULL OR type = $2)",
        )
        .bind(user)
        .bind(filter.transaction_type)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Unable to get sum for user {}", user))?;
        Ok(sum.unwrap_or(Decimal::ZERO))
    }
}
