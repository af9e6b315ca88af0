use crate::error::{json_response, parse_json, ApiError};
use crate::store::Store;
use crate::types::{is_valid_email, Account, NewAccount, Plan, PublicAccount};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{Deserialize, Serialize};

/// Display name of the synthetic operator identity.
pub const OPERATOR_NAME: &str = "Administrator";

/// Operator credentials supplied by configuration. The operator is never a
/// stored account row and its id is always 0.
#[derive(Debug, Clone)]
pub struct OperatorConfig {
    pub email: String,
    pub password_hash: String,
}

impl OperatorConfig {
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok()?;
        let password_hash = std::env::var("ADMIN_PASSWORD_HASH").ok()?;
        Some(Self {
            email,
            password_hash,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub plan: Option<String>,
    pub amount: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(flatten)]
    account: PublicAccount,
    is_admin: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperatorLoginResponse {
    id: i64,
    name: &'static str,
    email: String,
    is_admin: bool,
}

/// Outcome of a successful credential check.
#[derive(Debug)]
pub enum AuthIdentity {
    Account(Account),
    Operator,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("Password hashing failed: {}", err);
            ApiError::Internal
        })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Create an account. Plan defaults to starter and amount to 100 when
/// omitted; the email must not already be claimed.
pub async fn register_account(
    store: &dyn Store,
    req: RegisterRequest,
) -> Result<Account, ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }

    let email = req.email.trim();
    if email.is_empty() || !is_valid_email(email) {
        return Err(ApiError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }

    if req.password.is_empty() {
        return Err(ApiError::Validation(
            "password must not be empty".to_string(),
        ));
    }

    let plan = match req.plan.as_deref() {
        None => Plan::Starter,
        Some(code) => Plan::parse(code)
            .ok_or_else(|| ApiError::Validation(format!("unknown plan '{}'", code)))?,
    };

    let amount = req.amount.unwrap_or(100);
    if amount < 100 {
        return Err(ApiError::Validation(
            "amount must be at least 100".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let account = store
        .create_account(NewAccount {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            plan,
            amount,
        })
        .await?;

    Ok(account)
}

/// Credential check. The configured operator pair is tried before the
/// account store and never touches it; unknown email and wrong password
/// produce the same error.
pub async fn authenticate(
    store: &dyn Store,
    operator: Option<&OperatorConfig>,
    email: &str,
    password: &str,
) -> Result<AuthIdentity, ApiError> {
    if let Some(op) = operator {
        if email == op.email && verify_password(password, &op.password_hash) {
            return Ok(AuthIdentity::Operator);
        }
    }

    match store.account_by_email(email).await? {
        Some(account) if verify_password(password, &account.password_hash) => {
            Ok(AuthIdentity::Account(account))
        }
        _ => Err(ApiError::InvalidCredentials),
    }
}

// POST /api/auth/register
pub async fn register(store: &dyn Store, body: &Body) -> Result<Response<Body>, Error> {
    let req = match parse_json::<RegisterRequest>(body) {
        Ok(req) => req,
        Err(err) => return err.into_response(),
    };

    tracing::info!("Register request for {}", req.email);

    match register_account(store, req).await {
        Ok(account) => json_response(StatusCode::OK, &account.public()),
        Err(err) => err.into_response(),
    }
}

// POST /api/auth/login
pub async fn login(
    store: &dyn Store,
    operator: Option<&OperatorConfig>,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req = match parse_json::<LoginRequest>(body) {
        Ok(req) => req,
        Err(err) => return err.into_response(),
    };

    tracing::info!("Login request for {}", req.email);

    match authenticate(store, operator, &req.email, &req.password).await {
        Ok(AuthIdentity::Operator) => json_response(
            StatusCode::OK,
            &OperatorLoginResponse {
                id: 0,
                name: OPERATOR_NAME,
                email: req.email,
                is_admin: true,
            },
        ),
        Ok(AuthIdentity::Account(account)) => json_response(
            StatusCode::OK,
            &LoginResponse {
                account: account.public(),
                is_admin: false,
            },
        ),
        Err(err) => err.into_response(),
    }
}
