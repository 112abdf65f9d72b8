//! Registration, lookup and login verification.

use std::sync::Arc;

use versawiki_cache::CoherentCache;
use versawiki_core::error::CoreError;
use versawiki_core::password::{hash_password, verify_password};
use versawiki_core::types::DbId;
use versawiki_core::validation::{validate_email, validate_password, validate_username};
use versawiki_db::models::user::{CreateUser, User};
use versawiki_db::store::UserStore;
use versawiki_db::StoreError;

use crate::error::{WikiError, WikiResult};
use crate::keys;

const LOGIN_FAILED: &str = "Invalid username or password";

/// Users, read through and written through the cache.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    cache: CoherentCache,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>, cache: CoherentCache) -> Self {
        Self { users, cache }
    }

    /// Register a new user.
    ///
    /// Inputs are validated here even if the caller already did. A taken
    /// username is a [`CoreError::Conflict`], whether seen by the up-front
    /// lookup or by the store's unique constraint in a race.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> WikiResult<User> {
        validate_username(username)?;
        validate_password(password)?;
        let email = email.filter(|e| !e.is_empty());
        if let Some(email) = email {
            validate_email(email)?;
        }

        if self.find_by_username(username).await?.is_some() {
            return Err(CoreError::Conflict("That user already exists".into()).into());
        }

        let input = CreateUser {
            username: username.to_string(),
            password_hash: hash_password(username, password, None),
            email: email.map(str::to_string),
        };
        let user = match self.users.insert(&input).await {
            Ok(user) => user,
            Err(StoreError::Duplicate(_)) => {
                return Err(CoreError::Conflict("That user already exists".into()).into())
            }
            Err(e) => return Err(e.into()),
        };

        self.cache.put(&keys::user_by_name(&user.username), &user).await?;
        self.cache.put(&keys::user_by_id(user.id), &user).await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Resolve a user by id or username.
    ///
    /// All-digit input is an id; anything else is a username.
    pub async fn lookup(&self, id_or_username: &str) -> WikiResult<User> {
        let is_id =
            !id_or_username.is_empty() && id_or_username.bytes().all(|b| b.is_ascii_digit());
        let found = if is_id {
            match id_or_username.parse::<DbId>() {
                Ok(id) => self.find_by_id(id).await?,
                Err(_) => None,
            }
        } else {
            self.find_by_username(id_or_username).await?
        };
        found.ok_or_else(|| CoreError::not_found("User", id_or_username).into())
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords are the same
    /// [`CoreError::Unauthorized`].
    pub async fn verify_login(&self, username: &str, password: &str) -> WikiResult<User> {
        let Some(user) = self.find_by_username(username).await? else {
            tracing::debug!(username, "Login for unknown user");
            return Err(CoreError::Unauthorized(LOGIN_FAILED.into()).into());
        };

        if !verify_password(username, password, &user.password_hash) {
            tracing::info!(user_id = user.id, "Failed login attempt");
            return Err(CoreError::Unauthorized(LOGIN_FAILED.into()).into());
        }

        Ok(user)
    }

    /// Cache-first lookup by id. A miss also fills the username key.
    pub async fn find_by_id(&self, id: DbId) -> WikiResult<Option<User>> {
        let users = &self.users;
        let cache = &self.cache;
        self.cache
            .get_or_load(&keys::user_by_id(id), move || async move {
                let user = users.find_by_id(id).await?;
                if let Some(user) = &user {
                    cache.fill(&keys::user_by_name(&user.username), user).await?;
                }
                Ok::<_, WikiError>(user)
            })
            .await
    }

    /// Cache-first lookup by username. A miss also fills the id key.
    pub async fn find_by_username(&self, username: &str) -> WikiResult<Option<User>> {
        let users = &self.users;
        let cache = &self.cache;
        self.cache
            .get_or_load(&keys::user_by_name(username), move || async move {
                let user = users.find_by_username(username).await?;
                if let Some(user) = &user {
                    cache.fill(&keys::user_by_id(user.id), user).await?;
                }
                Ok::<_, WikiError>(user)
            })
            .await
    }

    pub(crate) async fn ping(&self) -> WikiResult<()> {
        Ok(self.users.ping().await?)
    }
}
