use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{AppConfig, AuthMode};
use crate::errors::AppError;

pub const AUTH_USER_HEADER: &str = "x-auth-user";

/// The caller, as established by the active [`IdentityVerifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub identifier: String,
    pub domain: Option<String>,
}

/// Ways a request can be turned into a [`Principal`].
#[derive(Debug, Clone)]
pub enum IdentityVerifier {
    /// Development mode: trust the `X-Auth-User` header, accepting a bare
    /// identifier or an address in `allowed_domain`.
    Mock { allowed_domain: String },
    /// Production mode: bearer tokens issued by the SSO broker at `issuer`.
    BearerToken { issuer: Option<String> },
}

impl IdentityVerifier {
    pub fn verify(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        match self {
            IdentityVerifier::Mock { allowed_domain } => verify_mock(headers, allowed_domain),
            IdentityVerifier::BearerToken { issuer } => verify_bearer(headers, issuer.as_deref()),
        }
    }
}

fn verify_mock(headers: &HeaderMap, allowed_domain: &str) -> Result<Principal, AppError> {
    let user = headers
        .get(AUTH_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if user.is_empty() {
        return Err(AppError::Unauthorized(
            "X-Auth-User header required in mock mode".to_string(),
        ));
    }

    match user.split_once('@') {
        Some((local, domain)) => {
            if domain != allowed_domain {
                warn!("Rejected identity from domain '{}'", domain);
                return Err(AppError::Forbidden(format!(
                    "Only @{} emails are allowed",
                    allowed_domain
                )));
            }
            if local.is_empty() {
                return Err(AppError::Unauthorized(
                    "X-Auth-User header has an empty user name".to_string(),
                ));
            }
            Ok(Principal {
                identifier: local.to_string(),
                domain: Some(domain.to_string()),
            })
        }
        None => Ok(Principal {
            identifier: user.to_string(),
            domain: None,
        }),
    }
}

fn verify_bearer(headers: &HeaderMap, issuer: Option<&str>) -> Result<Principal, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if token.is_none() {
        return Err(AppError::Unauthorized("Bearer token required".to_string()));
    }

    // TODO: validate the token against the issuer's JWKS once the SSO realm is provisioned.
    debug!("Bearer token presented for issuer {:?}", issuer);
    Err(AppError::NotImplemented(
        "SSO auth not yet implemented".to_string(),
    ))
}

/// Verifier plus the static admin list.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub verifier: IdentityVerifier,
    pub admin_users: Vec<String>,
}

impl AuthContext {
    pub fn new(verifier: IdentityVerifier, admin_users: Vec<String>) -> Self {
        Self {
            verifier,
            admin_users,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let verifier = match config.auth_mode {
            AuthMode::Mock => IdentityVerifier::Mock {
                allowed_domain: config.allowed_domain.clone(),
            },
            AuthMode::Sso => IdentityVerifier::BearerToken {
                issuer: config.sso_issuer_url.clone(),
            },
        };
        Self::new(verifier, config.admin_users.clone())
    }

    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.admin_users
            .iter()
            .any(|admin| admin == &principal.identifier)
    }

    pub fn require_admin(&self, principal: &Principal, message: &str) -> Result<(), AppError> {
        if self.is_admin(principal) {
            Ok(())
        } else {
            Err(AppError::Forbidden(message.to_string()))
        }
    }
}

/// Rejects the request unless the verifier yields a principal, which is then
/// made available to handlers as `Extension<Principal>`.
pub async fn require_principal(
    State(auth): State<Arc<AuthContext>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = auth.verifier.verify(request.headers())?;
    debug!("Authenticated request from '{}'", principal.identifier);
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    fn mock() -> IdentityVerifier {
        IdentityVerifier::Mock {
            allowed_domain: "samsung.com".to_string(),
        }
    }

    fn headers(user: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_USER_HEADER, user.parse().unwrap());
        headers
    }

    #[test]
    fn mock_accepts_bare_identifier() {
        let principal = mock().verify(&headers("jisung.jang")).unwrap();
        assert_eq!(principal.identifier, "jisung.jang");
        assert_eq!(principal.domain, None);
    }

    #[test]
    fn mock_strips_allowed_domain() {
        let principal = mock().verify(&headers(" jisung.jang@samsung.com ")).unwrap();
        assert_eq!(principal.identifier, "jisung.jang");
        assert_eq!(principal.domain.as_deref(), Some("samsung.com"));
    }

    #[test]
    fn mock_rejects_other_domains_and_missing_header() {
        let err = mock().verify(&headers("someone@gmail.com")).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = mock().verify(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = mock().verify(&headers("   ")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn bearer_mode_is_not_implemented_yet() {
        let verifier = IdentityVerifier::BearerToken { issuer: None };
        let err = verifier.verify(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let mut with_token = HeaderMap::new();
        with_token.insert(AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        let err = verifier.verify(&with_token).unwrap_err();
        assert!(matches!(err, AppError::NotImplemented(_)));
    }

    #[test]
    fn admin_membership_uses_identifier() {
        let ctx = AuthContext::new(mock(), vec!["jisung.jang".to_string()]);
        let admin = mock().verify(&headers("jisung.jang@samsung.com")).unwrap();
        let other = mock().verify(&headers("kim")).unwrap();
        assert!(ctx.is_admin(&admin));
        assert!(!ctx.is_admin(&other));
        assert!(ctx.require_admin(&other, "Admin access required").is_err());
    }

    fn app() -> Router {
        let ctx = Arc::new(AuthContext::new(mock(), vec![]));
        Router::new()
            .route(
                "/whoami",
                get(|Extension(principal): Extension<Principal>| async move {
                    principal.identifier
                }),
            )
            .layer(axum::middleware::from_fn_with_state(ctx, require_principal))
    }

    #[tokio::test]
    async fn middleware_injects_principal() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(AUTH_USER_HEADER, "jisung.jang@samsung.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"jisung.jang");
    }

    #[tokio::test]
    async fn middleware_rejects_foreign_domain() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(AUTH_USER_HEADER, "x@example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
