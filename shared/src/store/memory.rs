use super::{Store, StoreError};
use crate::types::{Account, ContactMessage, InvestmentUpdate, NewAccount, NewContactMessage};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory backend for tests and local development. Same semantics as
/// `DynamoStore`: store-assigned monotonic ids, unique emails, last write
/// wins.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: BTreeMap<i64, Account>,
    messages: Vec<ContactMessage>,
    next_account_id: i64,
    next_message_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.lock()?;
        if inner.accounts.values().any(|a| a.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.next_account_id += 1;
        let account = Account {
            id: inner.next_account_id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            plan: new.plan,
            amount: new.amount,
            join_date: Utc::now().to_rfc3339(),
        };
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_investment(
        &self,
        id: i64,
        update: InvestmentUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let mut inner = self.lock()?;
        Ok(inner.accounts.get_mut(&id).map(|account| {
            account.plan = update.plan;
            account.amount = update.amount;
            account.clone()
        }))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        // BTreeMap iteration is already ascending by id.
        Ok(self.lock()?.accounts.values().cloned().collect())
    }

    async fn create_contact_message(
        &self,
        new: NewContactMessage,
    ) -> Result<ContactMessage, StoreError> {
        let mut inner = self.lock()?;
        inner.next_message_id += 1;
        let message = ContactMessage {
            id: inner.next_message_id,
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            created_at: Utc::now().to_rfc3339(),
        };
        inner.messages.push(message.clone());
        Ok(message)
    }
}
