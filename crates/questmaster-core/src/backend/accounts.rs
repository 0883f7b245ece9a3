//! Local account registry, kept next to the player data under `users`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, ValidationError};
use crate::storage::{keys, KeyValueStore};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,
    pub email: String,
    /// SHA-256 of the password, lowercase hex.
    pub password_hash: String,
}

pub struct AccountRegistry<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> AccountRegistry<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn accounts(&self) -> Result<Vec<Account>, CoreError> {
        match self.store.get(keys::USERS)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Register a new account.
    ///
    /// Every field is required, the confirmation must match, the password
    /// needs at least [`MIN_PASSWORD_LEN`] characters and the email must
    /// not be taken.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<Account, CoreError> {
        let (name, email, password, confirm) = (name.trim(), email.trim(), password.trim(), confirm.trim());
        for (field, value) in [
            ("name", name),
            ("email", email),
            ("password", password),
            ("confirm_password", confirm),
        ] {
            if value.is_empty() {
                return Err(ValidationError::MissingField(field).into());
            }
        }
        if password != confirm {
            return Err(ValidationError::invalid("confirm_password", "passwords do not match").into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::invalid(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            )
            .into());
        }

        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.email.eq_ignore_ascii_case(email)) {
            return Err(ValidationError::DuplicateAccount(email.to_string()).into());
        }

        let account = Account {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
        };
        accounts.push(account.clone());
        self.store.set(keys::USERS, &serde_json::to_string(&accounts)?)?;
        tracing::info!(email, "account registered");
        Ok(account)
    }

    /// Check credentials and return the matching account.
    pub fn login(&self, email: &str, password: &str) -> Result<Account, CoreError> {
        let (email, password) = (email.trim(), password.trim());
        if email.is_empty() {
            return Err(ValidationError::MissingField("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        let hash = hash_password(password);
        self.accounts()?
            .into_iter()
            .find(|a| a.email.eq_ignore_ascii_case(email) && a.password_hash == hash)
            .ok_or_else(|| ValidationError::InvalidCredentials.into())
    }
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
