//! 内存账号仓储

use std::collections::HashMap;

use async_trait::async_trait;
use portal_errors::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::domain::account::Account;
use crate::domain::repositories::AccountRepository;

/// 内存账号仓储
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.accounts.read().await.contains_key(id))
    }

    async fn create(&self, account: &Account) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(AppError::conflict(format!("Account {} already exists", account.id)));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!("Account {} not found", account.id))),
        }
    }
}
