//! The `DirectoryStore` seam between the engine and the directory service,
//! plus the in-memory implementation used by tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::DirectoryError;
use crate::types::{DirectoryUser, NewUser, UserName};

/// Directory operations the reconciliation engine needs.
///
/// Mutations address users by the opaque key from [`DirectoryUser::id`], not
/// the roster external id.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All users with the reconciliation field projection.
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError>;

    async fn insert_user(&self, user: NewUser) -> Result<DirectoryUser, DirectoryError>;

    async fn set_suspended(&self, user_key: &str, suspended: bool)
        -> Result<(), DirectoryError>;

    async fn set_primary_address(
        &self,
        user_key: &str,
        address: &str,
    ) -> Result<(), DirectoryError>;

    async fn set_name(
        &self,
        user_key: &str,
        given_name: &str,
        family_name: &str,
    ) -> Result<(), DirectoryError>;

    async fn set_org_unit(&self, user_key: &str, path: &str) -> Result<(), DirectoryError>;
}

/// In-memory directory used by engine tests and fixture rehearsals.
///
/// Mutations apply to the held users, so a second reconciliation run against
/// the same store observes the converged state.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: Mutex<BTreeMap<String, DirectoryUser>>,
    next_key: Mutex<u64>,
}

impl MemoryDirectory {
    pub fn new(users: Vec<DirectoryUser>) -> Self {
        let map = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: Mutex::new(map),
            next_key: Mutex::new(0),
        }
    }

    /// Snapshot of a single user, for assertions.
    pub fn get(&self, user_key: &str) -> Option<DirectoryUser> {
        self.users.lock().unwrap().get(user_key).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.lock().unwrap().is_empty()
    }

    fn with_user<T>(
        &self,
        user_key: &str,
        f: impl FnOnce(&mut DirectoryUser) -> T,
    ) -> Result<T, DirectoryError> {
        let mut users = self.users.lock().unwrap();
        users
            .get_mut(user_key)
            .map(f)
            .ok_or_else(|| DirectoryError::NotFound {
                user_key: user_key.to_string(),
            })
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<DirectoryUser, DirectoryError> {
        let key = {
            let mut next = self.next_key.lock().unwrap();
            *next += 1;
            format!("mem-{next}")
        };
        let full_name = format!("{} {}", user.name.given_name, user.name.family_name);
        let created = DirectoryUser {
            id: key.clone(),
            primary_email: user.primary_email,
            name: UserName {
                full_name,
                ..user.name
            },
            suspended: user.suspended,
            suspension_reason: None,
            org_unit_path: user.org_unit_path,
            external_ids: Some(user.external_ids),
            custom_schemas: None,
            last_login_time: None,
        };
        self.users.lock().unwrap().insert(key, created.clone());
        Ok(created)
    }

    async fn set_suspended(
        &self,
        user_key: &str,
        suspended: bool,
    ) -> Result<(), DirectoryError> {
        self.with_user(user_key, |u| {
            u.suspended = suspended;
            u.suspension_reason = suspended.then(|| "roster reconciliation".to_string());
        })
    }

    async fn set_primary_address(
        &self,
        user_key: &str,
        address: &str,
    ) -> Result<(), DirectoryError> {
        self.with_user(user_key, |u| u.primary_email = address.to_string())
    }

    async fn set_name(
        &self,
        user_key: &str,
        given_name: &str,
        family_name: &str,
    ) -> Result<(), DirectoryError> {
        self.with_user(user_key, |u| {
            u.name.given_name = given_name.to_string();
            u.name.family_name = family_name.to_string();
            u.name.full_name = format!("{given_name} {family_name}");
        })
    }

    async fn set_org_unit(&self, user_key: &str, path: &str) -> Result<(), DirectoryError> {
        self.with_user(user_key, |u| u.org_unit_path = path.to_string())
    }
}
