//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /auth/register → Accounts::register
//!     → signup code check → password.rs (hash) → users.rs (insert)
//!     → tokens.rs (issue bearer token)
//! POST /auth/login → Accounts::login
//!     → users.rs (lookup) → password.rs (verify) → tokens.rs (issue)
//! /concerts/* → middleware.rs (bearer token → UserClaims extension)
//! ```
//!
//! # Design Decisions
//! - Tokens are opaque UUIDs resolved server-side
//! - Unknown email and wrong password produce the same error and cost the
//!   same bcrypt verification
//! - User persistence sits behind `UserStore` (SQLite by default)

pub mod middleware;
pub mod password;
pub mod tokens;
pub mod users;

use std::sync::Arc;

use serde::Deserialize;

use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult};
use self::password::PasswordHasher;
use self::tokens::TokenStore;
use self::users::{NewUser, StoreError, UserClaims, UserStore};

pub use middleware::require_auth;
pub use users::SqliteUserStore;

const MIN_PASSWORD_LEN: usize = 5;

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub signup_code: String,
}

impl RegisterRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut problems = Vec::new();
        if !looks_like_email(&self.email) {
            problems.push("email must be a valid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            problems.push("password must be at least 5 characters");
        }
        if self.name.trim().is_empty() {
            problems.push("name must not be empty");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::bad_request(problems.join(", ")))
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(char::is_whitespace),
        None => false,
    }
}

/// Registration and login on top of a user store and a token store.
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn UserStore>,
    tokens: TokenStore,
    hasher: Arc<PasswordHasher>,
    signup_code: String,
}

impl Accounts {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenStore, config: &AuthConfig) -> Self {
        Self {
            store,
            tokens,
            hasher: Arc::new(PasswordHasher::new(config.bcrypt_cost)),
            signup_code: config.signup_code.clone(),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Register a user and return a bearer token.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<String> {
        if request.signup_code != self.signup_code {
            tracing::warn!(email = %request.email, "Registration with invalid signup code");
            return Err(ApiError::unauthorized("Invalid sign up code!"));
        }
        request.validate()?;

        let hasher = Arc::clone(&self.hasher);
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| hashing_failed(e.to_string()))?
            .map_err(|e| hashing_failed(e.to_string()))?;

        let claims = self
            .store
            .insert(NewUser {
                email: request.email,
                name: request.name.trim().to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail(_) => ApiError::bad_request("Email already in use."),
                StoreError::Unavailable(reason) => {
                    tracing::error!(%reason, "User store failed during registration");
                    ApiError::bad_request("Unable to add user.")
                }
            })?;

        tracing::info!(user_id = claims.id, "User registered");
        Ok(self.tokens.issue(claims))
    }

    /// Check credentials and return a bearer token.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<String> {
        let claims = self.authenticate(&request.email, &request.password).await?;
        tracing::info!(user_id = claims.id, "User logged in");
        Ok(self.tokens.issue(claims))
    }

    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<UserClaims> {
        let record = self.store.find_by_email(email).await.map_err(|e| {
            tracing::error!(error = %e, "User store failed during login");
            ApiError::Internal("Unable to log in.".into())
        })?;

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || match record {
            Some(user) => hasher.verify(&password, &user.password_hash).then_some(user.claims),
            None => {
                hasher.verify_decoy(&password);
                None
            }
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            ApiError::Internal("Unable to log in.".into())
        })?;

        verified.ok_or_else(|| ApiError::unauthorized("Invalid email/password"))
    }
}

fn hashing_failed(reason: String) -> ApiError {
    tracing::error!(%reason, "Password hashing failed");
    ApiError::bad_request("Unable to add user.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn accounts() -> Accounts {
        let config = AuthConfig {
            signup_code: "test_code".into(),
            bcrypt_cost: 4,
            ..AuthConfig::default()
        };
        Accounts::new(
            Arc::new(SqliteUserStore::open(":memory:").unwrap()),
            TokenStore::new(Duration::from_secs(60)),
            &config,
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "password".to_string(),
            name: "Test User".to_string(),
            signup_code: "test_code".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_valid_token() {
        let accounts = accounts();
        let token = accounts.register(register_request("new@test.com")).await.unwrap();

        let claims = accounts.tokens().verify(&token).unwrap();
        assert_eq!(claims.email, "new@test.com");
        assert_eq!(claims.name, "Test User");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_signup_code() {
        let mut request = register_request("new@test.com");
        request.signup_code = "wrong".into();
        let err = accounts().register(request).await.unwrap_err();
        assert_eq!(err, ApiError::unauthorized("Invalid sign up code!"));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let accounts = accounts();
        accounts.register(register_request("dup@test.com")).await.unwrap();
        let err = accounts.register(register_request("DUP@test.com")).await.unwrap_err();
        assert_eq!(err, ApiError::bad_request("Email already in use."));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_data() {
        let mut request = register_request("not-an-email");
        request.password = "abc".into();
        let err = accounts().register(request).await.unwrap_err();
        match err {
            ApiError::BadRequest(message) => {
                assert!(message.contains("email"));
                assert!(message.contains("password"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_with_correct_credentials() {
        let accounts = accounts();
        accounts.register(register_request("fan@test.com")).await.unwrap();

        let token = accounts
            .login(LoginRequest {
                email: "fan@test.com".into(),
                password: "password".into(),
            })
            .await
            .unwrap();
        assert_eq!(accounts.tokens().verify(&token).unwrap().email, "fan@test.com");
    }

    #[tokio::test]
    async fn test_login_failures_are_unauthorized() {
        let accounts = accounts();
        accounts.register(register_request("fan@test.com")).await.unwrap();

        for (email, password) in [("nobody@test.com", "password"), ("fan@test.com", "wrong")] {
            let err = accounts
                .login(LoginRequest {
                    email: email.into(),
                    password: password.into(),
                })
                .await
                .unwrap_err();
            assert_eq!(err, ApiError::unauthorized("Invalid email/password"));
        }
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_a_verification() {
        let accounts = accounts();
        let err = accounts
            .login(LoginRequest {
                email: "nobody@test.com".into(),
                password: "password".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::unauthorized("Invalid email/password"));

        assert!(accounts.hasher.decoy_ready());
    }

    #[tokio::test]
    async fn test_stored_password_is_bcrypt() {
        let accounts = accounts();
        accounts.register(register_request("fan@test.com")).await.unwrap();
        let record = accounts.store.find_by_email("fan@test.com").await.unwrap().unwrap();
        assert!(record.password_hash.starts_with("$2b$04$"));
        assert!(accounts.hasher.verify("password", &record.password_hash));
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("fan@test.com"));
        assert!(!looks_like_email("fan@test"));
        assert!(!looks_like_email("@test.com"));
        assert!(!looks_like_email("fan test@test.com"));
    }
}
