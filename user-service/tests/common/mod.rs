use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::ApiKey;
use auth::AuthSettings;
use auth::Authenticator;
use auth::Identity;
use auth::IdentityStore;
use auth::IdentityStoreError;
use auth::InMemoryRefreshTokenRepository;
use auth::ManualClock;
use chrono::TimeZone;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;
use user_service::domain::chirp::errors::ChirpError;
use user_service::domain::chirp::models::Chirp;
use user_service::domain::chirp::models::ChirpId;
use user_service::domain::chirp::models::ListChirpsQuery;
use user_service::domain::chirp::models::SortOrder;
use user_service::domain::chirp::ports::ChirpRepository;
use user_service::domain::chirp::service::ChirpService;
use user_service::domain::session::service::SessionService;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::user::errors::UserError;

pub const JWT_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub clock: Arc<ManualClock>,
}

/// User storage backed by a map, shared by the user service and the auth core
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    fn email_taken(users: &HashMap<UserId, User>, user: &User) -> bool {
        users
            .values()
            .any(|other| other.id != user.id && other.email == user.email)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        if Self::email_taken(&users, &user) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_chirpy_red(&self, id: &UserId) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for InMemoryUserRepository {
    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Identity>, IdentityStoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.as_str() == email)
            .map(|user| Identity {
                user_id: user.id,
                password_hash: user.password_hash.clone(),
            }))
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<Identity>, IdentityStoreError> {
        Ok(self.users.read().await.get(id).map(|user| Identity {
            user_id: user.id,
            password_hash: user.password_hash.clone(),
        }))
    }
}

/// Chirp storage backed by a map
#[derive(Default)]
pub struct InMemoryChirpRepository {
    chirps: RwLock<HashMap<ChirpId, Chirp>>,
}

#[async_trait]
impl ChirpRepository for InMemoryChirpRepository {
    async fn create(&self, chirp: Chirp) -> Result<Chirp, ChirpError> {
        self.chirps.write().await.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn find_by_id(&self, id: &ChirpId) -> Result<Option<Chirp>, ChirpError> {
        Ok(self.chirps.read().await.get(id).cloned())
    }

    async fn list(&self, query: &ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .read()
            .await
            .values()
            .filter(|chirp| query.author_id.map_or(true, |author| chirp.author_id == author))
            .cloned()
            .collect();
        chirps.sort_by_key(|chirp| chirp.created_at);
        if query.sort == SortOrder::Descending {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn delete(&self, id: &ChirpId) -> Result<(), ChirpError> {
        self.chirps
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ChirpError::NotFound(id.to_string()))
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap(),
        ));

        let user_repo = Arc::new(InMemoryUserRepository::default());
        let authenticator = Arc::new(Authenticator::new(
            &AuthSettings::new(JWT_SECRET),
            Arc::clone(&user_repo),
            Arc::new(InMemoryRefreshTokenRepository::new()),
            clock.clone(),
        ));

        let session_service = Arc::new(SessionService::new(authenticator, ApiKey::new(POLKA_KEY)));
        let user_service = Arc::new(UserService::new(user_repo));
        let chirp_service = Arc::new(ChirpService::new(Arc::new(
            InMemoryChirpRepository::default(),
        )));

        let router = create_router(user_service, session_service, chirp_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            clock,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.delete(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.put(path).bearer_auth(token)
    }

    /// Create a user and return the response body's `data` object
    pub async fn create_user(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/users")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    /// Post a chirp as the owner of `token` and return the response body's `data` object
    pub async fn create_chirp(&self, token: &str, body: &str) -> serde_json::Value {
        let response = self
            .post_authenticated("/api/chirps", token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    /// Log in and return the response body's `data` object
    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }
}
