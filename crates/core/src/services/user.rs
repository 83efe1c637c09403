//! User service.

use chrono::Utc;
use reviewboard_common::{AppError, AppResult, IdGenerator};
use reviewboard_db::entities::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::password::SharedPasswordHasher;
use super::store::SharedUserDirectory;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    users: SharedUserDirectory,
    hasher: SharedPasswordHasher,
    id_gen: IdGenerator,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RegisterInput {
    #[validate(length(max = 128))]
    #[serde(default)]
    pub username: String,

    #[validate(length(max = 128))]
    #[serde(default)]
    #[serde(skip_serializing)]
    pub password: String,
}

/// Input for logging in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    #[serde(skip_serializing)]
    pub password: String,
}

/// Input for updating the own profile.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 128))]
    #[serde(default)]
    pub username: String,

    /// New password; blank keeps the current one.
    #[validate(length(max = 128))]
    #[serde(skip_serializing)]
    pub password: Option<String>,

    #[serde(skip_serializing)]
    pub confirm_password: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(users: SharedUserDirectory, hasher: SharedPasswordHasher) -> Self {
        Self {
            users,
            hasher,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new user.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        let username = input.username.trim();
        if username.is_empty() || input.password.trim().is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        input.validate()?;

        if self.users.exists_by_username(username, None).await? {
            return Err(AppError::UsernameTaken);
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .users
            .insert(user::Model {
                id: self.id_gen.generate(),
                username: username.to_string(),
                password_hash,
                created_at: Utc::now().into(),
                updated_at: None,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check credentials. Unknown users and wrong passwords fail alike.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        let Some(user) = self.users.find_by_username(input.username.trim()).await? else {
            tracing::debug!(username = %input.username, "Login for unknown user");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(&input.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User: {user_id}")))
    }

    /// Rename a user and optionally change the password.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        input.validate()?;

        let new_password = non_blank(input.password.as_deref());
        if let Some(password) = new_password
            && Some(password) != input.confirm_password.as_deref()
        {
            return Err(AppError::Validation(
                "Password confirmation does not match".to_string(),
            ));
        }

        let mut user = self.get(user_id).await?;

        if username != user.username
            && self.users.exists_by_username(username, Some(user_id)).await?
        {
            return Err(AppError::UsernameTaken);
        }

        user.username = username.to_string();
        if let Some(password) = new_password {
            user.password_hash = self.hasher.hash(password)?;
        }
        user.updated_at = Some(Utc::now().into());

        let updated = self.users.update(user).await?;
        tracing::info!(user_id = %updated.id, password_changed = new_password.is_some(), "Profile updated");
        Ok(updated)
    }
}
