use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::constants::USER_SEARCH_LIMIT;
use crate::modules::user::model::{
    InsertUser, LoginModel, LoginResponse, RegisterModel, UpdateUser, UpdateUserModel,
    UserResponse,
};
use crate::modules::user::repository::UserRepository;
use crate::utils::{hash_password, verify_password, Claims};

/// Signing material for the access tokens handed out at login.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    tokens: TokenSettings,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        tokens: TokenSettings,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, tokens }
    }

    pub async fn register(&self, user: RegisterModel) -> Result<UserResponse, error::SystemError> {
        let hash_password = hash_password(&user.password)?;
        let created =
            self.repo.create(&InsertUser { username: user.username, hash_password }).await?;
        info!("User {} registered", created.id);
        Ok(UserResponse::from(created))
    }

    pub async fn login(&self, user: LoginModel) -> Result<LoginResponse, error::SystemError> {
        let user_entity = self
            .repo
            .find_by_username(&user.username)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid username or password"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid username or password"));
        }

        let seen = self
            .repo
            .touch_last_seen(&user_entity.id, chrono::Utc::now())
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid username or password"))?;

        let access_token = Claims::new(&seen.id, &seen.username, self.tokens.expiration)
            .encode(self.tokens.secret.as_bytes())?;

        Ok(LoginResponse { user: UserResponse::from(seen), access_token })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, error::SystemError> {
        Claims::decode(token, self.tokens.secret.as_bytes())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<UserResponse>, error::SystemError> {
        let users = self.repo.search_users(query.trim(), USER_SEARCH_LIMIT).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<UserResponse, error::SystemError> {
        self.repo
            .find_by_username(username)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| error::SystemError::not_found(format!("User not found: {username}")))
    }

    pub async fn update(
        &self,
        id: Uuid,
        user: UpdateUserModel,
    ) -> Result<UserResponse, error::SystemError> {
        if user.username.is_none() && user.password.is_none() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let hash_password = match user.password {
            Some(password) => Some(hash_password(&password)?),
            None => None,
        };

        let updated = self
            .repo
            .update(&id, &UpdateUser { username: user.username, hash_password })
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(UserResponse::from(updated))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        info!("User {} deleted", id);
        Ok(())
    }

    pub async fn heartbeat(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        self.repo
            .touch_last_seen(&id, chrono::Utc::now())
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }
}
