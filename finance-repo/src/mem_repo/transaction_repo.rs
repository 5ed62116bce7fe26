use super::MemRepo;
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionId, TransactionRepo, TransactionRepoError,
    TransactionUpdate,
};
use crate::user_repo::UserId;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

#[async_trait]
impl TransactionRepo for MemRepo {
    async fn get_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionNotFound(transaction_id))
    }

    async fn get_all_transactions(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        let transactions = read_guard
            .transactions
            .values()
            .filter(|t| t.user_id == user && filter.matches(t))
            .cloned()
            .collect();
        Ok(transactions)
    }

    async fn create_new_transaction(
        &self,
        user: UserId,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.users.contains_key(&user) {
            return Err(anyhow!("User {} does not exist", user).into());
        }

        let id = write_guard.next_transaction_id;
        write_guard.next_transaction_id += 1;

        let transaction = new_transaction.to_transaction(id, user, Utc::now());
        write_guard.transactions.insert(id, transaction.clone());

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        transaction_id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        let Some(transaction) = write_guard.transactions.get_mut(&transaction_id) else {
            return Err(TransactionNotFound(transaction_id));
        };
        update.apply(transaction, Utc::now());

        Ok(transaction.clone())
    }

    async fn delete_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard
            .transactions
            .remove(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))
    }

    async fn get_sum(&self, user: UserId, filter: Filter) -> Result<Decimal, TransactionRepoError> {
        self.get_all_transactions(user, filter)
            .await?
            .into_iter()
            .try_fold(Decimal::ZERO, |sum, t| sum.checked_add(t.amount))
            .ok_or_else(|| anyhow!("Sum of transaction amounts overflows").into())
    }
}
