//! Authentication service for user registration, login, and token management

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{validate_registration, AuthSession, User, UserRole, ValidationError};
use tokio::sync::RwLock;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

const BCRYPT_COST: u32 = 10;

pub const DEMO_EMAIL: &str = "demo@wateroasis.com";

const SEED_PASSWORD_HASH: &str = "$2a$10$92IXUNpkjO0rOQ5byMi.Ye4oKoEa3Ro9llC/.og/at2.uheWG/igi";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: u64,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// User together with the password hash, never serialized
#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<RwLock<Vec<UserRecord>>>,
    jwt_secret: String,
    token_expiry_secs: i64,
}

impl AuthService {
    /// Create a new AuthService seeded with the demo and admin accounts
    pub fn new(config: &JwtConfig) -> Self {
        let now = Utc::now();
        let seed = |id, email: &str, name: &str, role| UserRecord {
            user: User {
                id,
                email: email.to_string(),
                name: name.to_string(),
                role,
                created_at: now,
            },
            password_hash: SEED_PASSWORD_HASH.to_string(),
        };

        Self {
            users: Arc::new(RwLock::new(vec![
                seed(1, DEMO_EMAIL, "Demo User", UserRole::User),
                seed(2, "admin@wateroasis.com", "Admin User", UserRole::Admin),
            ])),
            jwt_secret: config.secret.clone(),
            token_expiry_secs: config.token_expiry_secs,
        }
    }

    /// Register a new user account
    pub async fn register(&self, email: &str, password: &str, name: &str) -> AppResult<AuthSession> {
        validate_registration(email, password, name)?;

        let email = email.to_lowercase();

        // Hash before taking the lock
        let password_hash = hash(password, BCRYPT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut users = self.users.write().await;
        if users.iter().any(|r| r.user.email.to_lowercase() == email) {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let user = User {
            id: users.iter().map(|r| r.user.id).max().map_or(1, |max| max + 1),
            email,
            name: name.trim().to_string(),
            role: UserRole::User,
            created_at: Utc::now(),
        };
        users.push(UserRecord {
            user: user.clone(),
            password_hash,
        });
        drop(users);

        tracing::info!(user_id = user.id, "User registered");
        self.session_for(user)
    }

    /// Authenticate with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        if email.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields("Email and password are required").into());
        }

        let record = self
            .find_by_email(email)
            .await
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &record.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = record.user.id, "User logged in");
        self.session_for(record.user)
    }

    /// Session for the shared demo account
    pub async fn demo_login(&self) -> AppResult<AuthSession> {
        let record = self
            .find_by_email(DEMO_EMAIL)
            .await
            .ok_or_else(|| AppError::Internal("Demo user not found".to_string()))?;
        self.session_for(record.user)
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: u64) -> AppResult<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone())
            .ok_or(AppError::NotFound("User"))
    }

    /// Issue a fresh token for an existing user
    pub async fn refresh(&self, id: u64) -> AppResult<String> {
        let user = self.get_user(id).await?;
        self.issue_token(&user)
    }

    /// Sign a token for the user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: (now + Duration::seconds(self.token_expiry_secs)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Decode and validate a token
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::InvalidToken(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let email = email.to_lowercase();
        self.users
            .read()
            .await
            .iter()
            .find(|r| r.user.email.to_lowercase() == email)
            .cloned()
    }

    fn session_for(&self, user: User) -> AppResult<AuthSession> {
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry_secs: 3600,
        })
    }

    #[test]
    fn test_token_round_trip() {
        let service = service();
        let user = User {
            id: 7,
            email: "amina@example.com".to_string(),
            name: "Amina".to_string(),
            role: UserRole::Admin,
            created_at: Utc::now(),
        };

        let token = service.issue_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = AuthService::new(&JwtConfig {
            secret: "another-secret".to_string(),
            token_expiry_secs: 3600,
        });
        let session_token = other
            .issue_token(&User {
                id: 1,
                email: DEMO_EMAIL.to_string(),
                name: "Demo User".to_string(),
                role: UserRole::User,
                created_at: Utc::now(),
            })
            .unwrap();

        assert!(matches!(
            service().verify_token(&session_token),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_register_normalizes_and_rejects_duplicates() {
        let service = service();
        let session = service
            .register("Wanjiru@Example.com", "secret1", "  Wanjiru Kamau ")
            .await
            .unwrap();
        assert_eq!(session.user.id, 3);
        assert_eq!(session.user.email, "wanjiru@example.com");
        assert_eq!(session.user.name, "Wanjiru Kamau");

        let err = service
            .register("WANJIRU@example.com", "secret2", "Someone Else")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let service = service();
        service
            .register("otieno@example.com", "river-123", "Otieno")
            .await
            .unwrap();

        assert!(service.login("Otieno@example.com", "river-123").await.is_ok());
        assert!(matches!(
            service.login("otieno@example.com", "wrong-pass").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("nobody@example.com", "river-123").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("", "river-123").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_demo_login_and_refresh() {
        let service = service();
        let session = service.demo_login().await.unwrap();
        assert_eq!(session.user.email, DEMO_EMAIL);

        let claims = service.verify_token(&session.token).unwrap();
        assert!(service.refresh(claims.id).await.is_ok());
        assert!(matches!(service.refresh(99).await, Err(AppError::NotFound("User"))));
    }
}
