//! Keeps secrets, such as the Jira password, out of configuration files by storing them in
//! the credential store of the operating system: the Keychain on macOS, the Credential
//! Manager on Windows and the Secret Service / keyutils on Linux.
//!
//! Secrets are identified by a `service` (the application identifier) and an `account`
//! (the user name).
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Unable to access the credential store for {service}/{account}: {reason}")]
    Store {
        service: String,
        account: String,
        reason: String,
    },
}

pub trait CredentialStore: Send + Sync {
    /// Retrieves the secret stored for `service` and `account`, `None` if there is none
    ///
    /// # Errors
    /// If the underlying store could not be accessed
    fn load(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError>;

    /// Stores `secret` for `service` and `account`, replacing any previous value
    ///
    /// # Errors
    /// If the underlying store could not be written to
    fn save(&self, service: &str, account: &str, secret: &str) -> Result<(), CredentialError>;

    /// Removes the secret, removing something which is not there is not an error
    ///
    /// # Errors
    /// If the underlying store could not be accessed
    fn delete(&self, service: &str, account: &str) -> Result<(), CredentialError>;
}

/// The credential store of the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainStore;

fn store_error(service: &str, account: &str, err: &keyring::Error) -> CredentialError {
    CredentialError::Store {
        service: service.to_string(),
        account: account.to_string(),
        reason: err.to_string(),
    }
}

impl KeychainStore {
    fn entry(service: &str, account: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(service, account).map_err(|e| store_error(service, account, &e))
    }
}

impl CredentialStore for KeychainStore {
    fn load(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError> {
        match Self::entry(service, account)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(store_error(service, account, &e)),
        }
    }

    fn save(&self, service: &str, account: &str, secret: &str) -> Result<(), CredentialError> {
        Self::entry(service, account)?
            .set_password(secret)
            .map_err(|e| store_error(service, account, &e))
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), CredentialError> {
        match Self::entry(service, account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(store_error(service, account, &e)),
        }
    }
}

/// Keeps the secrets for the lifetime of the process only
#[derive(Debug, Default)]
pub struct InMemoryStore {
    secrets: Mutex<HashMap<(String, String), String>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn secrets(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        self.secrets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for InMemoryStore {
    fn load(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError> {
        Ok(self
            .secrets()
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn save(&self, service: &str, account: &str, secret: &str) -> Result<(), CredentialError> {
        self.secrets().insert(
            (service.to_string(), account.to_string()),
            secret.to_string(),
        );
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), CredentialError> {
        self.secrets()
            .remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}
