use crate::token_repo::{AuthToken, TokenRepo};
use crate::transaction_repo::{Transaction, TransactionId, TransactionRepo};
use crate::user_repo::{User, UserId, UserRepo};
use anyhow::anyhow;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod token_repo;
mod transaction_repo;
mod user_repo;

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    transactions: BTreeMap<TransactionId, Transaction>,
    tokens: HashMap<String, AuthToken>,
    next_user_id: UserId,
    next_transaction_id: TransactionId,
}

/// Keeps every table behind one lock so that cascading deletes are atomic.
pub struct MemRepo {
    state: RwLock<State>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        let state = State {
            next_user_id: 1,
            next_transaction_id: 1,
            ..State::default()
        };
        MemRepo {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        MemRepo::new()
    }
}

pub fn create_repos() -> (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn TokenRepo>,
) {
    let repo = Arc::new(MemRepo::new());
    (repo.clone(), repo.clone(), repo)
}
