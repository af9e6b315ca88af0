use super::{Store, StoreError};
use crate::types::{
    Account, ContactMessage, InvestmentUpdate, NewAccount, NewContactMessage, Plan,
};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::Utc;
use std::collections::HashMap;

/// Single-table layout:
///   USER#{id} / METADATA       - account row
///   EMAIL#{email} / METADATA   - uniqueness pointer, holds the account id
///   CONTACT#{id} / METADATA    - contact message row
///   COUNTER#{seq} / METADATA   - atomic id counter
pub struct DynamoStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: DynamoClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// Next value of a named monotonic sequence via an atomic ADD.
    async fn next_id(&self, sequence: &str) -> Result<i64, StoreError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(format!("COUNTER#{}", sequence)))
            .key("SK", AttributeValue::S("METADATA".to_string()))
            .update_expression("ADD #v :one")
            .expression_attribute_names("#v", "current_value")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to advance {} counter: {:?}", sequence, e)))?;

        result
            .attributes()
            .and_then(|attrs| attrs.get("current_value"))
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok())
            .ok_or_else(|| StoreError::Backend(format!("Counter {} returned no value", sequence)))
    }

    async fn account_row(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(format!("USER#{}", id)))
            .key("SK", AttributeValue::S("METADATA".to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to fetch account {}: {:?}", id, e)))?;

        match result.item() {
            Some(item) => Ok(Some(account_from_item(item)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Store for DynamoStore {
    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        self.account_row(id).await
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(format!("EMAIL#{}", email)))
            .key("SK", AttributeValue::S("METADATA".to_string()))
            .send()
            .await
            .map_err(|e| {
                StoreError::Backend(format!("Failed to fetch email pointer: {:?}", e))
            })?;

        let id = match result
            .item()
            .and_then(|item| item.get("user_id"))
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok())
        {
            Some(id) => id,
            None => return Ok(None),
        };

        self.account_row(id).await
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let id = self.next_id("accounts").await?;
        let join_date = Utc::now().to_rfc3339();

        // The email pointer gates uniqueness; the conditional put loses to
        // whichever registration claimed the address first.
        let claim = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(format!("EMAIL#{}", new.email)))
            .item("SK", AttributeValue::S("METADATA".to_string()))
            .item("user_id", AttributeValue::N(id.to_string()))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await;

        if let Err(e) = claim {
            if e.as_service_error()
                .map(|s| s.is_conditional_check_failed_exception())
                .unwrap_or(false)
            {
                return Err(StoreError::DuplicateEmail);
            }
            return Err(StoreError::Backend(format!(
                "Failed to claim email pointer: {:?}",
                e
            )));
        }

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(format!("USER#{}", id)))
            .item("SK", AttributeValue::S("METADATA".to_string()))
            .item("id", AttributeValue::N(id.to_string()))
            .item("name", AttributeValue::S(new.name.clone()))
            .item("email", AttributeValue::S(new.email.clone()))
            .item("password_hash", AttributeValue::S(new.password_hash.clone()))
            .item("plan", AttributeValue::S(new.plan.code().to_string()))
            .item("amount", AttributeValue::N(new.amount.to_string()))
            .item("join_date", AttributeValue::S(join_date.clone()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to create account: {:?}", e)))?;

        Ok(Account {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            plan: new.plan,
            amount: new.amount,
            join_date,
        })
    }

    async fn update_investment(
        &self,
        id: i64,
        update: InvestmentUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(format!("USER#{}", id)))
            .key("SK", AttributeValue::S("METADATA".to_string()))
            .update_expression("SET #p = :plan, #a = :amount")
            .expression_attribute_names("#p", "plan")
            .expression_attribute_names("#a", "amount")
            .expression_attribute_values(":plan", AttributeValue::S(update.plan.code().to_string()))
            .expression_attribute_values(":amount", AttributeValue::N(update.amount.to_string()))
            .condition_expression("attribute_exists(PK)")
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => match output.attributes() {
                Some(item) => Ok(Some(account_from_item(item)?)),
                None => Ok(None),
            },
            Err(e) => {
                if e.as_service_error()
                    .map(|s| s.is_conditional_check_failed_exception())
                    .unwrap_or(false)
                {
                    return Ok(None);
                }
                Err(StoreError::Backend(format!(
                    "Failed to update account {}: {:?}",
                    id, e
                )))
            }
        }
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let result = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("begins_with(PK, :prefix)")
                .expression_attribute_values(":prefix", AttributeValue::S("USER#".to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to list accounts: {:?}", e)))?;

            for item in result.items() {
                accounts.push(account_from_item(item)?);
            }

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        // Scan order is arbitrary; the admin view expects ascending ids.
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }

    async fn create_contact_message(
        &self,
        new: NewContactMessage,
    ) -> Result<ContactMessage, StoreError> {
        let id = self.next_id("contact_messages").await?;
        let created_at = Utc::now().to_rfc3339();

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(format!("CONTACT#{}", id)))
            .item("SK", AttributeValue::S("METADATA".to_string()))
            .item("id", AttributeValue::N(id.to_string()))
            .item("name", AttributeValue::S(new.name.clone()))
            .item("email", AttributeValue::S(new.email.clone()))
            .item("subject", AttributeValue::S(new.subject.clone()))
            .item("message", AttributeValue::S(new.message.clone()))
            .item("created_at", AttributeValue::S(created_at.clone()))
            .send()
            .await
            .map_err(|e| {
                StoreError::Backend(format!("Failed to create contact message: {:?}", e))
            })?;

        Ok(ContactMessage {
            id,
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            created_at,
        })
    }
}

fn account_from_item(item: &HashMap<String, AttributeValue>) -> Result<Account, StoreError> {
    let id = item
        .get("id")
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or_else(|| malformed("id"))?;
    let name = item
        .get("name")
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| malformed("name"))?;
    let email = item
        .get("email")
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| malformed("email"))?;
    let password_hash = item
        .get("password_hash")
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| malformed("password_hash"))?;
    let plan = item
        .get("plan")
        .and_then(|v| v.as_s().ok())
        .and_then(|code| Plan::parse(code))
        .ok_or_else(|| malformed("plan"))?;
    let amount = item
        .get("amount")
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or_else(|| malformed("amount"))?;
    let join_date = item
        .get("join_date")
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| malformed("join_date"))?;

    Ok(Account {
        id,
        name,
        email,
        password_hash,
        plan,
        amount,
        join_date,
    })
}

fn malformed(attribute: &str) -> StoreError {
    StoreError::Backend(format!("Account item missing or malformed '{}'", attribute))
}
