//! Authentication service: login, user creation and the bootstrap admin

use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use validator::Validate;

use crate::config::BootstrapConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{CreateUserInput, LoginInput, LoginResponse, Role, UserSummary};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl UserRow {
    fn role(&self) -> AppResult<Role> {
        self.role.parse().map_err(|_| {
            AppError::Internal(format!(
                "User {} has unknown role '{}'",
                self.username, self.role
            ))
        })
    }

    fn into_auth_user(self) -> AppResult<AuthUser> {
        let role = self.role()?;
        Ok(AuthUser {
            id: self.id,
            username: self.username,
            role,
        })
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_row(&self, username: &str) -> AppResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    /// Look up the user named by the `X-Username` header
    pub async fn find_user(&self, username: &str) -> AppResult<Option<AuthUser>> {
        self.find_row(username)
            .await?
            .map(UserRow::into_auth_user)
            .transpose()
    }

    /// Verify a username/password pair
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            return Err(AppError::ValidationError(
                "Username and password are required".to_string(),
            ));
        }

        let user = self
            .find_row(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::info!(username = %username, "Rejected login");
            return Err(AppError::InvalidCredentials);
        }

        let role = user.role()?;
        tracing::info!(username = %user.username, role = %role, "User logged in");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            username: user.username,
            role,
        })
    }

    /// Create a new user account
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<UserSummary> {
        let input = CreateUserInput {
            username: input.username.trim().to_string(),
            ..input
        };
        input.validate()?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(&input.username)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("User already exists".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&input.username)
        .bind(&password_hash)
        .bind(input.role.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(username = %input.username, role = %input.role, "User created");

        Ok(UserSummary {
            id,
            username: input.username,
            role: input.role,
        })
    }

    /// Create the configured admin account when no admin exists yet
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<()> {
        let admin_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')",
        )
        .fetch_one(&self.db)
        .await?;

        if admin_exists {
            return Ok(());
        }

        let password_hash = hash(&bootstrap.admin_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, 'admin')
            ON CONFLICT (username) DO UPDATE SET role = 'admin'
            "#,
        )
        .bind(&bootstrap.admin_username)
        .bind(&password_hash)
        .execute(&self.db)
        .await?;

        tracing::warn!(
            username = %bootstrap.admin_username,
            "Created bootstrap admin account; change its password"
        );

        Ok(())
    }
}
