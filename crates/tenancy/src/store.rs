//! Storage traits and in-memory implementations.
//!
//! Every store sits behind a trait so the in-memory backends used in dev and
//! tests can be swapped for a shared external document store without touching
//! the pipeline. Counting methods return the authoritative live count; the
//! limit gate depends on that (no cached counters).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use merx_core::{DomainError, DomainResult, TenantId, UserId};

use crate::role::RoleRecord;
use crate::tenant::Tenant;
use crate::user::UserRecord;

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

pub trait UserStore: Send + Sync {
    fn get(&self, id: UserId) -> Option<UserRecord>;
    fn find_by_email(&self, email: &str) -> Option<UserRecord>;
    /// Insert a new user. Fails with `Conflict` if the email is taken.
    fn insert(&self, user: UserRecord) -> DomainResult<()>;
    /// Replace an existing user record.
    fn update(&self, user: UserRecord) -> DomainResult<()>;
    /// Best-effort last-login stamp; callers must not fail a request on error.
    fn record_login(&self, id: UserId, at: DateTime<Utc>) -> DomainResult<()>;
    /// Live count of active members of a tenant.
    fn count_members(&self, tenant_id: TenantId) -> u64;
    /// All users holding a membership in the tenant.
    fn list_members(&self, tenant_id: TenantId) -> Vec<UserRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn get(&self, id: UserId) -> Option<UserRecord> {
        self.inner.read().ok()?.get(&id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let email = email.to_lowercase();
        let map = self.inner.read().ok()?;
        map.values().find(|u| u.email == email).cloned()
    }

    fn insert(&self, user: UserRecord) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        map.insert(user.id, user);
        Ok(())
    }

    fn update(&self, user: UserRecord) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if !map.contains_key(&user.id) {
            return Err(DomainError::NotFound);
        }
        map.insert(user.id, user);
        Ok(())
    }

    fn record_login(&self, id: UserId, at: DateTime<Utc>) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let user = map.get_mut(&id).ok_or(DomainError::NotFound)?;
        user.last_login_at = Some(at);
        Ok(())
    }

    fn count_members(&self, tenant_id: TenantId) -> u64 {
        let Ok(map) = self.inner.read() else { return 0 };
        map.values()
            .filter(|u| u.active && u.is_member(tenant_id))
            .count() as u64
    }

    fn list_members(&self, tenant_id: TenantId) -> Vec<UserRecord> {
        let Ok(map) = self.inner.read() else { return vec![] };
        map.values()
            .filter(|u| u.is_member(tenant_id))
            .cloned()
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tenants
// ─────────────────────────────────────────────────────────────────────────────

pub trait TenantDirectory: Send + Sync {
    fn get(&self, id: TenantId) -> Option<Tenant>;
    fn find_by_slug(&self, slug: &str) -> Option<Tenant>;
    /// Insert a new tenant. Fails with `Conflict` if the slug is taken.
    fn insert(&self, tenant: Tenant) -> DomainResult<()>;
    fn update(&self, tenant: Tenant) -> DomainResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryTenantDirectory {
    inner: RwLock<HashMap<TenantId, Tenant>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TenantDirectory for InMemoryTenantDirectory {
    fn get(&self, id: TenantId) -> Option<Tenant> {
        self.inner.read().ok()?.get(&id).cloned()
    }

    fn find_by_slug(&self, slug: &str) -> Option<Tenant> {
        let map = self.inner.read().ok()?;
        map.values().find(|t| t.slug == slug).cloned()
    }

    fn insert(&self, tenant: Tenant) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.values().any(|t| t.slug == tenant.slug) {
            return Err(DomainError::conflict(format!(
                "slug already registered: {}",
                tenant.slug
            )));
        }
        map.insert(tenant.id, tenant);
        Ok(())
    }

    fn update(&self, tenant: Tenant) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if !map.contains_key(&tenant.id) {
            return Err(DomainError::NotFound);
        }
        map.insert(tenant.id, tenant);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

pub trait RoleStore: Send + Sync {
    /// Insert a role. Fails with `Conflict` if `(tenant_id, key)` is taken.
    fn insert(&self, role: RoleRecord) -> DomainResult<()>;
    fn find(&self, tenant_id: Option<TenantId>, key: &str) -> Option<RoleRecord>;
    fn list_for_tenant(&self, tenant_id: TenantId) -> Vec<RoleRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    inner: RwLock<Vec<RoleRecord>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleStore for InMemoryRoleStore {
    fn insert(&self, role: RoleRecord) -> DomainResult<()> {
        let mut list = self.inner.write().map_err(poisoned)?;
        if list
            .iter()
            .any(|r| r.tenant_id == role.tenant_id && r.key == role.key)
        {
            return Err(DomainError::conflict(format!(
                "role key already defined: {}",
                role.key
            )));
        }
        list.push(role);
        Ok(())
    }

    fn find(&self, tenant_id: Option<TenantId>, key: &str) -> Option<RoleRecord> {
        let list = self.inner.read().ok()?;
        list.iter()
            .find(|r| r.tenant_id == tenant_id && r.key == key)
            .cloned()
    }

    fn list_for_tenant(&self, tenant_id: TenantId) -> Vec<RoleRecord> {
        let Ok(list) = self.inner.read() else { return vec![] };
        list.iter()
            .filter(|r| r.tenant_id == Some(tenant_id))
            .cloned()
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tenant-scoped record store (generic, for CRUD resources)
// ─────────────────────────────────────────────────────────────────────────────

/// Tenant-isolated key/value store for domain records.
pub trait RecordStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V>;
    fn upsert(&self, tenant_id: TenantId, key: K, value: V);
    fn remove(&self, tenant_id: TenantId, key: &K) -> bool;
    fn list(&self, tenant_id: TenantId) -> Vec<V>;
    /// Authoritative live count for the tenant (limit-gate input).
    fn count(&self, tenant_id: TenantId) -> u64;
}

impl<K, V, S> RecordStore<K, V> for Arc<S>
where
    S: RecordStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> bool {
        (**self).remove(tenant_id, key)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        (**self).list(tenant_id)
    }

    fn count(&self, tenant_id: TenantId) -> u64 {
        (**self).count(tenant_id)
    }
}

/// In-memory tenant-isolated store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<K, V> {
    inner: RwLock<HashMap<(TenantId, K), V>>,
}

impl<K, V> InMemoryRecordStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryRecordStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecordStore<K, V> for InMemoryRecordStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id, key.clone())).cloned()
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((tenant_id, key), value);
        }
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> bool {
        match self.inner.write() {
            Ok(mut map) => map.remove(&(tenant_id, key.clone())).is_some(),
            Err(_) => false,
        }
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        map.iter()
            .filter_map(|((t, _k), v)| if *t == tenant_id { Some(v.clone()) } else { None })
            .collect()
    }

    fn count(&self, tenant_id: TenantId) -> u64 {
        let Ok(map) = self.inner.read() else { return 0 };
        map.keys().filter(|(t, _k)| *t == tenant_id).count() as u64
    }
}

fn poisoned<T>(_e: std::sync::PoisonError<T>) -> DomainError {
    DomainError::conflict("store lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use merx_auth::UserKind;

    fn user(email: &str, memberships: Vec<TenantId>) -> UserRecord {
        UserRecord::new(email, "hash".into(), UserKind::CompanyUser, memberships, vec![], Utc::now())
            .unwrap()
    }

    #[test]
    fn user_store_enforces_unique_email() {
        let store = InMemoryUserStore::new();
        store.insert(user("a@example.com", vec![])).unwrap();
        let err = store.insert(user("A@Example.com", vec![])).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn member_count_is_live_and_skips_inactive() {
        let store = InMemoryUserStore::new();
        let tenant = TenantId::new();

        store.insert(user("a@example.com", vec![tenant])).unwrap();
        let mut b = user("b@example.com", vec![tenant]);
        b.active = false;
        store.insert(b).unwrap();

        assert_eq!(store.count_members(tenant), 1);
    }

    #[test]
    fn tenant_directory_enforces_unique_slug() {
        let dir = InMemoryTenantDirectory::new();
        let now = Utc::now();
        dir.insert(Tenant::register("acme", "Acme", crate::Tier::Free, now).unwrap())
            .unwrap();
        let err = dir
            .insert(Tenant::register("acme", "Other Acme", crate::Tier::Free, now).unwrap())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn role_store_enforces_tenant_key_uniqueness() {
        let store = InMemoryRoleStore::new();
        let a = TenantId::new();
        let b = TenantId::new();

        store.insert(RoleRecord::subscriber(a, "auditor", vec![], false)).unwrap();
        // Same key in a different tenant is fine.
        store.insert(RoleRecord::subscriber(b, "auditor", vec![], false)).unwrap();
        let err = store
            .insert(RoleRecord::subscriber(a, "auditor", vec![], false))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn record_store_isolates_tenants() {
        let store: InMemoryRecordStore<u32, String> = InMemoryRecordStore::new();
        let a = TenantId::new();
        let b = TenantId::new();

        store.upsert(a, 1, "a-one".into());
        store.upsert(b, 1, "b-one".into());
        store.upsert(b, 2, "b-two".into());

        assert_eq!(store.count(a), 1);
        assert_eq!(store.count(b), 2);
        assert_eq!(store.get(a, &1).as_deref(), Some("a-one"));
        assert!(store.remove(a, &1));
        assert_eq!(store.count(a), 0);
        assert_eq!(store.count(b), 2);
    }
}
