//! File-backed account storage.
//!
//! Accounts live in a single JSON file that is rewritten atomically on
//! every change (write to a sibling tmp file, then rename). A missing or
//! unreadable file yields an empty store rather than an error, so a
//! corrupted file costs the data but never the session.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Account, EngineError, Profile, ResultEngine};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsFile {
    active: Option<String>,
    accounts: HashMap<String, Account>,
}

/// The account registry plus the active-account pointer, persisted to a
/// JSON file.
#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    inner: AccountsFile,
}

impl AccountStore {
    /// Opens the store at `path`, starting empty when the file is
    /// missing or cannot be parsed.
    #[must_use]
    pub fn load_or_empty(path: impl Into<PathBuf>) -> AccountStore {
        let path = path.into();
        let inner = read_json_file(&path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "starting with empty account store");
            AccountsFile::default()
        });
        AccountStore { path, inner }
    }

    /// Creates an account and saves the file. The normalized email must
    /// be unique across the store.
    pub fn create(&mut self, profile: Profile) -> ResultEngine<&Account> {
        let email = profile.email.trim().to_lowercase();
        if self
            .inner
            .accounts
            .values()
            .any(|a| a.profile.email.trim().to_lowercase() == email)
        {
            return Err(EngineError::ExistingKey(email));
        }

        let id = format!("u_{}", Uuid::new_v4().simple());
        let account = Account {
            id: id.clone(),
            profile,
            saved_places: Vec::new(),
            wallet: crate::Wallet::default(),
            bookings: crate::BookingLog::default(),
        };
        self.inner.accounts.insert(id.clone(), account);
        self.save()?;
        Ok(&self.inner.accounts[&id])
    }

    /// Marks an account as active and saves the file.
    pub fn set_active(&mut self, id: &str) -> ResultEngine<()> {
        if !self.inner.accounts.contains_key(id) {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }
        self.inner.active = Some(id.to_string());
        self.save()
    }

    /// The active account, if one is set and still present.
    #[must_use]
    pub fn active(&self) -> Option<&Account> {
        self.inner
            .active
            .as_deref()
            .and_then(|id| self.inner.accounts.get(id))
    }

    /// All accounts, unordered.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.inner.accounts.values()
    }

    /// Applies a mutation to the active account and saves the file.
    ///
    /// Returns a snapshot of the account after the change, or
    /// [`EngineError::KeyNotFound`] when no account is active.
    pub fn update_active<F>(&mut self, mutate: F) -> ResultEngine<Account>
    where
        F: FnOnce(&mut Account),
    {
        let id = self
            .inner
            .active
            .clone()
            .ok_or_else(|| EngineError::KeyNotFound("active account".to_string()))?;
        let account = self
            .inner
            .accounts
            .get_mut(&id)
            .ok_or(EngineError::KeyNotFound(id))?;
        mutate(account);
        let snapshot = account.clone();
        self.save()?;
        Ok(snapshot)
    }

    fn save(&self) -> ResultEngine<()> {
        write_json_file(&self.path, &self.inner)
    }
}

fn read_json_file<T: for<'de> Deserialize<'de>>(path: &Path) -> ResultEngine<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Serializes `value` next to `path` and renames over it, so readers
/// never observe a half-written file.
fn write_json_file<T: Serialize>(path: &Path, value: &T) -> ResultEngine<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str) -> Profile {
        Profile {
            username: "jordan".to_string(),
            full_name: "Jordan Smith".to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::load_or_empty(dir.path().join("accounts.json"));
        assert!(store.active().is_none());
        assert_eq!(store.accounts().count(), 0);
    }

    #[test]
    fn create_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");

        let mut store = AccountStore::load_or_empty(&path);
        let id = store.create(profile("jordan@campus.edu")).unwrap().id.clone();
        store.set_active(&id).unwrap();

        let reloaded = AccountStore::load_or_empty(&path);
        assert_eq!(reloaded.active().unwrap().id, id);
        assert_eq!(reloaded.active().unwrap().profile.username, "jordan");
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AccountStore::load_or_empty(dir.path().join("accounts.json"));
        store.create(profile("jordan@campus.edu")).unwrap();

        let err = store.create(profile(" JORDAN@campus.edu ")).unwrap_err();
        assert_eq!(err, EngineError::ExistingKey("jordan@campus.edu".to_string()));
        assert_eq!(store.accounts().count(), 1);
    }

    #[test]
    fn update_active_saves_the_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");

        let mut store = AccountStore::load_or_empty(&path);
        let id = store.create(profile("jordan@campus.edu")).unwrap().id.clone();
        store.set_active(&id).unwrap();

        let now = chrono::Utc::now();
        store
            .update_active(|account| {
                account
                    .wallet
                    .add_funds(crate::Money::new(5_000), now)
                    .unwrap();
            })
            .unwrap();

        let reloaded = AccountStore::load_or_empty(&path);
        assert_eq!(
            reloaded.active().unwrap().wallet.balance(),
            crate::Money::new(5_000)
        );
    }

    #[test]
    fn update_without_active_account_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AccountStore::load_or_empty(dir.path().join("accounts.json"));
        assert!(store.update_active(|_| {}).is_err());
    }

    #[test]
    fn activating_unknown_account_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AccountStore::load_or_empty(dir.path().join("accounts.json"));
        assert!(store.set_active("u_missing").is_err());
    }
}
