use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::bootstrap::seed_initial_admin;
use account_service::config::AdminConfig;
use account_service::config::AppEnvironment;
use account_service::domain::auth::service::AuthService;
use account_service::domain::health::ports::HealthProbe;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::AppState;
use account_service::user::errors::UserError;
use account_service::user::models::EmailAddress;
use account_service::user::models::NewUser;
use account_service::user::models::PasswordPolicy;
use account_service::user::models::User;
use account_service::user::models::UserId;
use account_service::user::models::Username;
use account_service::user::ports::UserRepository;
use async_trait::async_trait;
use auth::Argon2Config;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Utc;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Adm1n!-integration-password-0123456789";
pub const USER_PASSWORD: &str = "Str0ng!pass";

/// User store backed by a vector, enforcing the same uniqueness rules as
/// the database schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
    unreachable: AtomicBool,
}

impl InMemoryUserRepository {
    /// Make the health probe fail, as a lost database connection would.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_unique(users: &[User], user: &User) -> Result<(), UserError> {
        for other in users.iter().filter(|other| other.id != user.id) {
            if other.email == user.email {
                return Err(UserError::EmailAlreadyExists(user.email.to_string()));
            }
            if other.username == user.username {
                return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        let now = Utc::now();
        let user = User {
            id: UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            password_hash: user.password_hash,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        Self::check_unique(&users, &user)?;
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == *email).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == *username).cloned())
    }

    async fn find_by_email_or_username(&self, identifier: &str) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email.as_str() == identifier || u.username.as_str() == identifier)
            .cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, UserError> {
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, &user)?;

        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;
        *slot = User {
            updated_at: Utc::now(),
            ..user
        };
        Ok(slot.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != *id);
        if users.len() == before {
            return Err(UserError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for InMemoryUserRepository {
    async fn ping(&self) -> anyhow::Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_issuer(TokenIssuer::new(JWT_SECRET)).await
    }

    /// Spawn with a custom token issuer (e.g. zero lifetimes)
    pub async fn spawn_with_issuer(token_issuer: TokenIssuer) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let hasher = PasswordHasher::new(&Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        })
        .expect("Failed to create password hasher");
        let authenticator = Arc::new(Authenticator::new(hasher, token_issuer));

        let repository = Arc::new(InMemoryUserRepository::default());

        seed_initial_admin(
            repository.as_ref(),
            &authenticator,
            &AdminConfig {
                email: ADMIN_EMAIL.to_string(),
                username: ADMIN_USERNAME.to_string(),
                password: Some(ADMIN_PASSWORD.to_string()),
            },
        )
        .await
        .expect("Failed to seed admin");

        let state = AppState {
            auth_service: Arc::new(AuthService::new(
                Arc::clone(&repository),
                Arc::clone(&authenticator),
            )),
            user_service: Arc::new(UserService::new(
                Arc::clone(&repository),
                Arc::clone(&authenticator),
            )),
            health_probe: Arc::clone(&repository) as Arc<dyn HealthProbe>,
            password_policy: Arc::new(PasswordPolicy::default()),
            environment: AppEnvironment::Testing,
        };

        let router = create_router(state, &["*".to_string()]);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            repository,
            authenticator,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(&format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(&format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user with the default test password; returns the response body
    pub async fn register(&self, username: &str) -> serde_json::Value {
        let response = self
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": format!("{}@example.com", username),
                "username": username,
                "password": USER_PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in through the form endpoint
    pub async fn login(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/auth/login")
            .form(&[("username", identifier), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the access token, panicking on failure
    pub async fn access_token(&self, identifier: &str, password: &str) -> String {
        let response = self.login(identifier, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.access_token(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }
}
