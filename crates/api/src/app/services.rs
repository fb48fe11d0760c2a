//! Store wiring and shared application state.
//!
//! All stores are trait objects so the in-memory backends can be replaced by
//! a shared document store without touching handlers or middleware.

use std::sync::Arc;

use uuid::Uuid;

use merx_auth::Hs256JwtKey;
use merx_tenancy::{
    InMemoryRecordStore, InMemoryRoleStore, InMemoryTenantDirectory, InMemoryUserStore,
    RecordStore, RoleStore, TenantDirectory, UserStore,
};

use crate::app::records::{CustomerRecord, LocationRecord, OrderRecord, ProductRecord};
use crate::config::AppConfig;

pub struct AppServices {
    pub config: AppConfig,
    pub jwt: Arc<Hs256JwtKey>,
    pub users: Arc<dyn UserStore>,
    pub tenants: Arc<dyn TenantDirectory>,
    pub roles: Arc<dyn RoleStore>,
    pub products: Arc<dyn RecordStore<Uuid, ProductRecord>>,
    pub locations: Arc<dyn RecordStore<Uuid, LocationRecord>>,
    pub customers: Arc<dyn RecordStore<Uuid, CustomerRecord>>,
    pub orders: Arc<dyn RecordStore<Uuid, OrderRecord>>,
}

pub fn build_services(config: AppConfig) -> AppServices {
    let jwt = Arc::new(Hs256JwtKey::new(config.jwt_secret.as_bytes()));

    AppServices {
        config,
        jwt,
        users: Arc::new(InMemoryUserStore::new()),
        tenants: Arc::new(InMemoryTenantDirectory::new()),
        roles: Arc::new(InMemoryRoleStore::new()),
        products: Arc::new(InMemoryRecordStore::new()),
        locations: Arc::new(InMemoryRecordStore::new()),
        customers: Arc::new(InMemoryRecordStore::new()),
        orders: Arc::new(InMemoryRecordStore::new()),
    }
}
