use crate::user_repo::UserId;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

pub type TransactionId = i64;

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    /// Looks up a transaction regardless of its owner. Callers are expected to check ownership.
    async fn get_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn get_all_transactions(
        &self,
        user: UserId,
        filter: Filter,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    async fn create_new_transaction(
        &self,
        user: UserId,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn update_transaction(
        &self,
        transaction_id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn delete_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn get_sum(&self, user: UserId, filter: Filter) -> Result<Decimal, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(TransactionId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
pub enum TransactionType {
    Earning,
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Earning, TransactionType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Earning => "earning",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earning" => Ok(TransactionType::Earning),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(()),
        }
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct Filter {
    pub transaction_type: Option<TransactionType>,
}

impl Filter {
    pub const NONE: Filter = Filter {
        transaction_type: None,
    };

    pub const fn of_type(transaction_type: TransactionType) -> Filter {
        Filter {
            transaction_type: Some(transaction_type),
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.transaction_type
            .map_or(true, |t| t == transaction.transaction_type)
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Transaction {
    pub id: TransactionId,
    pub name: String,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub name: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl NewTransaction {
    pub const fn new(
        name: String,
        transaction_type: TransactionType,
        amount: Decimal,
        date: NaiveDate,
        description: Option<String>,
    ) -> NewTransaction {
        NewTransaction {
            name,
            transaction_type,
            amount,
            date,
            description,
        }
    }

    pub(crate) fn to_transaction(
        self,
        id: TransactionId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id,
            name: self.name,
            user_id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            date: self.date,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Replacement values for an existing transaction. The owner is never part of an update.
#[derive(Clone, Debug)]
pub struct TransactionUpdate {
    pub name: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// `None` keeps the stored description.
    pub description: Option<String>,
}

impl TransactionUpdate {
    pub(crate) fn apply(self, transaction: &mut Transaction, now: DateTime<Utc>) {
        transaction.name = self.name;
        transaction.transaction_type = self.transaction_type;
        transaction.amount = self.amount;
        transaction.date = self.date;
        if let Some(description) = self.description {
            transaction.description = Some(description);
        }
        transaction.updated_at = now;
    }
}
