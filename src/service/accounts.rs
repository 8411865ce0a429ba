//! Registration, login and profile management.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{self, TokenService};
use crate::domain::aggregates::User;
use crate::domain::ports::{ListUsersParams, UserStore};
use crate::AccountError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self { Self { users, tokens } }

    pub fn tokens(&self) -> &TokenService { &self.tokens }

    pub async fn register(&self, mut registration: Registration) -> Result<User, AccountError> {
        registration.email = registration.email.trim().to_string();
        registration.name = registration.name.trim().to_string();
        registration
            .validate()
            .map_err(|_| AccountError::InvalidInput("invalid email, password or name".into()))?;

        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }
        let password = registration.password;
        let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))?
            .map_err(|e| AccountError::Hashing(e.to_string()))?;

        let user = User::register(registration.email, hash, registration.name);
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<Session, AccountError> {
        let email = credentials.email.trim().to_string();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(AccountError::InvalidInput("email and password required".into()));
        }
        let user = self.users.find_by_email(&email).await?.ok_or(AccountError::InvalidCredentials)?;

        let (password, hash) = (credentials.password, user.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))?;
        if !matches {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.roles)?;
        Ok(Session { token, user })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<User, AccountError> {
        self.users.find_by_id(user_id).await?.ok_or(AccountError::NotFound)
    }

    pub async fn update_name(&self, user_id: Uuid, name: &str) -> Result<User, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountError::InvalidInput("name required".into()));
        }
        self.users.update_name(user_id, name).await?.ok_or(AccountError::NotFound)
    }

    pub async fn list_users(&self, params: &ListUsersParams) -> Result<Vec<User>, AccountError> {
        self.users.list(params).await
    }
}
