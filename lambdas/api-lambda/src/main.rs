use aws_sdk_dynamodb::Client as DynamoClient;
use bitvest_shared::auth::OperatorConfig;
use bitvest_shared::store::DynamoStore;
use bitvest_shared::AppState;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Initialize AWS clients once at startup
    let config = aws_config::load_from_env().await;
    let table_name = std::env::var("TABLE_NAME").unwrap_or_else(|_| "bitvest".to_string());
    let store = Arc::new(DynamoStore::new(DynamoClient::new(&config), table_name));

    let operator = OperatorConfig::from_env();
    if operator.is_none() {
        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD_HASH not set; operator login disabled");
    }

    let state = AppState::new(store, operator);

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
