//! Persistence seam over the hosted table set. The production backend is a
//! single DynamoDB table; `MemoryStore` backs tests and local development.

mod dynamo;
mod memory;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

use crate::types::{Account, ContactMessage, InvestmentUpdate, NewAccount, NewContactMessage};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The storage engine owns id assignment, email uniqueness, and the
/// atomicity of single-row writes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Fails with `DuplicateEmail` when the email is already claimed.
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError>;

    /// Writes the plan/amount pair only; returns `None` for an unknown id.
    async fn update_investment(
        &self,
        id: i64,
        update: InvestmentUpdate,
    ) -> Result<Option<Account>, StoreError>;

    /// All accounts, ascending id.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    async fn create_contact_message(
        &self,
        new: NewContactMessage,
    ) -> Result<ContactMessage, StoreError>;
}
