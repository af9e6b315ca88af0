pub mod accounts;
pub mod auth;
pub mod contact;
pub mod error;
pub mod plans;
pub mod store;
pub mod types;

use crate::auth::OperatorConfig;
use crate::store::Store;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub operator: Option<OperatorConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, operator: Option<OperatorConfig>) -> Arc<Self> {
        Arc::new(Self { store, operator })
    }
}
