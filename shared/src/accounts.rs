use crate::error::{json_response, parse_json, ApiError};
use crate::plans;
use crate::store::Store;
use crate::types::{Account, Identity, InvestmentUpdate, Plan, PublicAccount};
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateInvestmentRequest {
    pub plan: String,
    pub amount: i64,
}

/// Dashboard view of an account: the public record plus the figures the
/// plan catalog derives from it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentView {
    #[serde(flatten)]
    pub account: PublicAccount,
    pub plan_name: String,
    pub return_rate: f64,
    pub monthly_return: f64,
}

pub fn investment_view(account: &Account) -> InvestmentView {
    let code = account.plan.code();
    InvestmentView {
        account: account.public(),
        plan_name: plans::display_name(code),
        return_rate: plans::monthly_return_rate(code),
        monthly_return: plans::monthly_return_amount(account.amount, code),
    }
}

/// Read an account's investment record. Self-or-operator only.
pub async fn get_investment(
    store: &dyn Store,
    requester: Identity,
    account_id: i64,
) -> Result<InvestmentView, ApiError> {
    if !requester.can_access(account_id) {
        return Err(ApiError::Forbidden);
    }

    let account = store
        .account_by_id(account_id)
        .await?
        .ok_or(ApiError::NotFound("Account"))?;

    Ok(investment_view(&account))
}

/// Write the plan/amount pair. Self-or-operator only; id, name, email and
/// join date are never touched. Repeated identical writes are idempotent.
pub async fn update_investment(
    store: &dyn Store,
    requester: Identity,
    account_id: i64,
    req: UpdateInvestmentRequest,
) -> Result<Account, ApiError> {
    if !requester.can_access(account_id) {
        return Err(ApiError::Forbidden);
    }

    let plan = Plan::parse(&req.plan)
        .ok_or_else(|| ApiError::Validation(format!("unknown plan '{}'", req.plan)))?;
    if req.amount < 100 {
        return Err(ApiError::Validation(
            "amount must be at least 100".to_string(),
        ));
    }

    store
        .update_investment(
            account_id,
            InvestmentUpdate {
                plan,
                amount: req.amount,
            },
        )
        .await?
        .ok_or(ApiError::NotFound("Account"))
}

/// All accounts, ascending id, passwords stripped. Operator only; the
/// synthetic operator itself is never stored, so no filtering is needed.
pub async fn list_accounts(
    store: &dyn Store,
    requester: Identity,
) -> Result<Vec<PublicAccount>, ApiError> {
    if !requester.is_operator() {
        return Err(ApiError::Forbidden);
    }

    let accounts = store.list_accounts().await?;
    Ok(accounts.iter().map(Account::public).collect())
}

// GET /api/user/{id}
pub async fn get(
    store: &dyn Store,
    requester: Identity,
    account_id: i64,
) -> Result<Response<Body>, Error> {
    match get_investment(store, requester, account_id).await {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(err) => err.into_response(),
    }
}

// PATCH /api/user/{id}
pub async fn update(
    store: &dyn Store,
    requester: Identity,
    account_id: i64,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req = match parse_json::<UpdateInvestmentRequest>(body) {
        Ok(req) => req,
        Err(err) => return err.into_response(),
    };

    match update_investment(store, requester, account_id, req).await {
        Ok(account) => json_response(StatusCode::OK, &account.public()),
        Err(err) => err.into_response(),
    }
}

// GET /api/admin/users
pub async fn list(store: &dyn Store, requester: Identity) -> Result<Response<Body>, Error> {
    match list_accounts(store, requester).await {
        Ok(accounts) => json_response(StatusCode::OK, &accounts),
        Err(err) => err.into_response(),
    }
}

// PATCH /api/admin/users/{id} - the admin console edits any account
pub async fn admin_update(
    store: &dyn Store,
    requester: Identity,
    account_id: i64,
    body: &Body,
) -> Result<Response<Body>, Error> {
    if !requester.is_operator() {
        return ApiError::Forbidden.into_response();
    }
    update(store, requester, account_id, body).await
}
