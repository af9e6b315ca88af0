use bitvest_shared::error::ApiError;
use bitvest_shared::types::Identity;
use bitvest_shared::{accounts, auth, contact, AppState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use std::sync::Arc;

/// Main Lambda handler - routes requests to the auth, investment and
/// contact endpoints.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET,POST,PATCH,OPTIONS")
            .header(
                "Access-Control-Allow-Headers",
                "Content-Type,Authorization,X-User-Id",
            )
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    let store = state.store.as_ref();
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, parts.as_slice()) {
        // Public endpoints
        (&Method::POST, ["api", "auth", "register"]) => auth::register(store, body).await,
        (&Method::POST, ["api", "auth", "login"]) => {
            auth::login(store, state.operator.as_ref(), body).await
        }
        (&Method::POST, ["api", "contact"]) => contact::submit(store, body).await,

        // Self-service endpoints; ownership is checked in the service
        (&Method::GET, ["api", "user", raw_id]) => {
            match (caller_identity(&event), parse_account_id(raw_id)) {
                (Some(identity), Ok(id)) => accounts::get(store, identity, id).await,
                (None, _) => ApiError::Unauthenticated.into_response(),
                (_, Err(err)) => err.into_response(),
            }
        }
        (&Method::PATCH, ["api", "user", raw_id]) => {
            match (caller_identity(&event), parse_account_id(raw_id)) {
                (Some(identity), Ok(id)) => accounts::update(store, identity, id, body).await,
                (None, _) => ApiError::Unauthenticated.into_response(),
                (_, Err(err)) => err.into_response(),
            }
        }

        // Admin console endpoints
        (&Method::GET, ["api", "admin", "users"]) => match caller_identity(&event) {
            Some(identity) => accounts::list(store, identity).await,
            None => ApiError::Unauthenticated.into_response(),
        },
        (&Method::PATCH, ["api", "admin", "users", raw_id]) => {
            match (caller_identity(&event), parse_account_id(raw_id)) {
                (Some(identity), Ok(id)) => {
                    accounts::admin_update(store, identity, id, body).await
                }
                (None, _) => ApiError::Unauthenticated.into_response(),
                (_, Err(err)) => err.into_response(),
            }
        }

        _ => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    }
}

/// Resolve the caller identity. The `sub` claim validated by the API
/// gateway authorizer is authoritative; id 0 in the claim denotes the
/// operator. The `X-User-Id` header is honored only when
/// ALLOW_HEADER_IDENTITY is set (local development) and can never assert
/// the operator.
fn caller_identity(event: &Request) -> Option<Identity> {
    if let Some(sub) = event
        .request_context_ref()
        .and_then(|ctx| ctx.authorizer())
        .and_then(|auth| auth.jwt.as_ref())
        .and_then(|jwt| jwt.claims.get("sub"))
    {
        let id: i64 = sub.trim().parse().ok()?;
        return Some(if id == 0 {
            Identity::Operator
        } else {
            Identity::Account { id }
        });
    }

    if std::env::var("ALLOW_HEADER_IDENTITY").is_err() {
        return None;
    }
    let raw = event.headers().get("X-User-Id")?.to_str().ok()?;
    header_identity(raw)
}

// Development-only identity override. Deliberately cannot produce the
// operator: that identity must come from the validated claim.
fn header_identity(raw: &str) -> Option<Identity> {
    let id: i64 = raw.trim().parse().ok()?;
    (id != 0).then_some(Identity::Account { id })
}

fn parse_account_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::Validation(format!("'{}' is not a valid account id", raw)))
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvest_shared::store::{MemoryStore, Store};
    use bitvest_shared::types::{NewAccount, Plan};
    use lambda_http::aws_lambda_events::apigw::{
        ApiGatewayRequestAuthorizer, ApiGatewayRequestAuthorizerJwtDescription,
        ApiGatewayV2httpRequestContext,
    };
    use lambda_http::http;
    use lambda_http::request::RequestContext;
    use std::collections::HashMap;

    async fn seeded() -> (Arc<AppState>, Arc<MemoryStore>, i64) {
        let store = Arc::new(MemoryStore::new());
        let account = store
            .create_account(NewAccount {
                name: "Alice".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "$argon2id$test".to_string(),
                plan: Plan::Starter,
                amount: 100,
            })
            .await
            .unwrap();
        (AppState::new(store.clone(), None), store, account.id)
    }

    fn request(method: &str, path: &str, body: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(format!("https://bitvest.test{}", path))
            .body(Body::Text(body.to_string()))
            .unwrap()
    }

    /// Attach a `sub` claim the way the gateway authorizer would.
    fn with_claim(req: Request, sub: &str) -> Request {
        let mut claims = HashMap::new();
        claims.insert("sub".to_string(), sub.to_string());
        let context = ApiGatewayV2httpRequestContext {
            authorizer: Some(ApiGatewayRequestAuthorizer {
                jwt: Some(ApiGatewayRequestAuthorizerJwtDescription {
                    claims,
                    scopes: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        req.with_request_context(RequestContext::ApiGatewayV2(context))
    }

    #[test]
    fn header_identity_never_grants_operator() {
        assert_eq!(header_identity("0"), None);
        assert_eq!(header_identity("7"), Some(Identity::Account { id: 7 }));
        assert_eq!(header_identity("abc"), None);
    }

    #[tokio::test]
    async fn preflight_is_allowed() {
        let (state, _, id) = seeded().await;
        let response = function_handler(request("OPTIONS", &format!("/api/user/{}", id), ""), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (state, _, _) = seeded().await;
        let response = function_handler(request("GET", "/api/unknown", ""), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let (state, _, id) = seeded().await;
        let response = function_handler(request("GET", &format!("/api/user/{}", id), ""), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_integer_account_id_is_rejected() {
        let (state, _, id) = seeded().await;
        let event = with_claim(request("GET", "/api/user/abc", ""), &id.to_string());
        let response = function_handler(event, state).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn spoofed_operator_header_cannot_mutate_accounts() {
        let (state, store, id) = seeded().await;

        let event = http::Request::builder()
            .method("PATCH")
            .uri(format!("https://bitvest.test/api/user/{}", id))
            .header("X-User-Id", "0")
            .body(Body::Text(r#"{"plan":"flexible","amount":99999}"#.to_string()))
            .unwrap();
        let response = function_handler(event, state).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let account = store.account_by_id(id).await.unwrap().unwrap();
        assert_eq!(account.plan, Plan::Starter);
        assert_eq!(account.amount, 100);
    }

    #[tokio::test]
    async fn claimed_owner_reads_own_account() {
        let (state, _, id) = seeded().await;
        let event = with_claim(request("GET", &format!("/api/user/{}", id), ""), &id.to_string());
        let response = function_handler(event, state).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_listing_requires_the_operator_claim() {
        let (state, _, id) = seeded().await;

        let event = with_claim(request("GET", "/api/admin/users", ""), &id.to_string());
        let response = function_handler(event, state.clone()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let event = with_claim(request("GET", "/api/admin/users", ""), "0");
        let response = function_handler(event, state).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
