//! Authentication service for registration, login, and token issuance
//!
//! Admins, workers and customers each authenticate against their own table
//! and receive a single access token carrying their role; worker and
//! customer accounts are provisioned by their admin through the worker and
//! customer services.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::types::Role;
use shared::validation::{validate_email, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a new farm admin
#[derive(Debug, Deserialize)]
pub struct RegisterAdminInput {
    pub name: String,
    pub farm_name: Option<String>,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub admin_id: Uuid,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login credentials
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Credential row shared by the three account tables
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    password_hash: String,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new farm admin account
    pub async fn register_admin(&self, input: RegisterAdminInput) -> AppResult<RegisterResponse> {
        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
        })?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM admins WHERE email = $1",
        )
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let admin_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO admins (name, farm_name, email, password_hash, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.farm_name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        let tokens = self.generate_tokens(admin_id, Role::Admin)?;

        Ok(RegisterResponse {
            admin_id,
            access_token: tokens.access_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        })
    }

    /// Authenticate a farm admin
    pub async fn login_admin(&self, input: LoginInput) -> AppResult<AuthTokens> {
        self.login_from_table("admins", Role::Admin, &input).await
    }

    /// Authenticate a worker account
    pub async fn login_worker(&self, input: LoginInput) -> AppResult<AuthTokens> {
        self.login_from_table("workers", Role::Worker, &input).await
    }

    /// Authenticate a customer account
    pub async fn login_customer(&self, input: LoginInput) -> AppResult<AuthTokens> {
        self.login_from_table("customers", Role::Customer, &input)
            .await
    }

    /// Shared login flow: look up by email, verify the bcrypt hash, issue
    /// a token carrying the role
    async fn login_from_table(
        &self,
        table: &str,
        role: Role,
        input: &LoginInput,
    ) -> AppResult<AuthTokens> {
        // Table name comes from the three fixed call sites above, never
        // from user input
        let query = format!("SELECT id, password_hash FROM {} WHERE email = $1", table);

        let account = sqlx::query_as::<_, AccountRow>(&query)
            .bind(&input.email)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &account.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        self.generate_tokens(account.id, role)
    }

    /// Generate an access token for the actor
    fn generate_tokens(&self, actor_id: Uuid, role: Role) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: actor_id.to_string(),
            role: role.as_str().to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }
}
