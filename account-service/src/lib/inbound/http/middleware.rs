use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use super::handlers::ApiError;
use crate::domain::auth::models::Access;
use crate::domain::auth::ports::AuthServicePort;
use crate::user::models::User;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Authenticated, active user resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Correlation id of the request being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Middleware that resolves the bearer token to an active user and stores
/// it in request extensions as `CurrentUser`.
pub async fn authenticate(
    State(auth_service): State<Arc<dyn AuthServicePort>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?.to_string();

    let user = auth_service.authorize(&token, &Access::ActiveUser).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Middleware that enforces an `Access` requirement on the user placed in
/// extensions by `authenticate`. Must be layered inside `authenticate`.
pub async fn require_access(
    State(access): State<Access>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(CurrentUser(user)) = req.extensions().get::<CurrentUser>() else {
        return Err(ApiError::Unauthorized(
            "Could not validate credentials".to_string(),
        ));
    };

    access.check(user)?;

    Ok(next.run(req).await)
}

/// Middleware that tags the request and its response with `x-request-id`.
///
/// An incoming non-empty id is echoed; otherwise a UUID v4 is generated.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let value = match req.headers().get(REQUEST_ID_HEADER) {
        Some(incoming) if !incoming.is_empty() => incoming.clone(),
        _ => HeaderValue::from_str(&Uuid::new_v4().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
    };

    let id = value.to_str().unwrap_or_default().to_string();
    req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    req.extensions_mut().insert(RequestId(id));

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
    response
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let unauthorized = || ApiError::Unauthorized("Not authenticated".to_string());

    let auth_str = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(unauthorized)?
        .to_str()
        .map_err(|_| unauthorized())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(unauthorized()),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::TokenPair;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::routing::get;
    use axum::Extension;
    use axum::Router;
    use chrono::Utc;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::auth::errors::AuthError;
    use crate::domain::auth::models::Credentials;
    use crate::domain::auth::models::RegisterCommand;
    use crate::user::models::EmailAddress;
    use crate::user::models::Role;
    use crate::user::models::UserId;
    use crate::user::models::Username;

    /// Accepts the tokens "regular" and "moderator"; rejects everything else.
    struct StubAuthService;

    fn user(role: Role) -> User {
        User {
            id: UserId(1),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            username: Username::new("alice".to_string()).unwrap(),
            full_name: None,
            password_hash: String::new(),
            is_active: true,
            is_superuser: false,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl AuthServicePort for StubAuthService {
        async fn register(&self, _command: RegisterCommand) -> Result<User, AuthError> {
            unimplemented!()
        }

        async fn authenticate(&self, _credentials: Credentials) -> Result<TokenPair, AuthError> {
            unimplemented!()
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, AuthError> {
            unimplemented!()
        }

        async fn authorize(&self, access_token: &str, access: &Access) -> Result<User, AuthError> {
            let user = match access_token {
                "regular" => user(Role::User),
                "moderator" => user(Role::Moderator),
                _ => return Err(AuthError::InvalidAccessToken),
            };
            access.check(&user)?;
            Ok(user)
        }
    }

    async fn whoami(Extension(CurrentUser(user)): Extension<CurrentUser>) -> String {
        user.username.to_string()
    }

    fn app(access: Access) -> Router {
        let auth_service: Arc<dyn AuthServicePort> = Arc::new(StubAuthService);

        Router::new()
            .route("/protected", get(whoami))
            .route_layer(middleware::from_fn_with_state(access, require_access))
            .route_layer(middleware::from_fn_with_state(auth_service, authenticate))
            .layer(middleware::from_fn(request_id))
    }

    fn request(token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/protected");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = app(Access::ActiveUser).oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let req = HttpRequest::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
            .body(Body::empty())
            .unwrap();

        let response = app(Access::ActiveUser).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let response = app(Access::ActiveUser)
            .oneshot(request(Some("regular")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"alice");
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let response = app(Access::ActiveUser)
            .oneshot(request(Some("forged")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_superuser_required() {
        let response = app(Access::Superuser)
            .oneshot(request(Some("regular")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_role_required() {
        let moderators = Access::AnyRole(vec![Role::Admin, Role::Moderator]);

        let allowed = app(moderators.clone())
            .oneshot(request(Some("moderator")))
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);

        let denied = app(moderators)
            .oneshot(request(Some("regular")))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_request_id_generated_and_echoed() {
        let generated = app(Access::ActiveUser).oneshot(request(None)).await.unwrap();
        let id = generated
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(id).is_ok());

        let req = HttpRequest::builder()
            .uri("/protected")
            .header(REQUEST_ID_HEADER, "trace-123")
            .body(Body::empty())
            .unwrap();
        let echoed = app(Access::ActiveUser).oneshot(req).await.unwrap();
        assert_eq!(echoed.headers().get(REQUEST_ID_HEADER).unwrap(), "trace-123");
    }
}
