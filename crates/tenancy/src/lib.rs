//! `merx-tenancy` — tenants, identities and the admission pipeline.
//!
//! Everything needed to admit (or refuse) a request before a controller
//! runs: tenant/user/role records, the storage traits they live behind, the
//! ordered tenant-resolution strategies, and the subscription/limit gates.
//! HTTP wiring lives in `merx-api`; nothing here touches a socket.

pub mod error;
pub mod gates;
pub mod resolver;
pub mod role;
pub mod store;
pub mod tenant;
pub mod user;

pub use error::AdmissionError;
pub use gates::{BoundedResource, ensure_capacity, ensure_subscription};
pub use resolver::{ResolvedVia, ResolutionRequest, ensure_member, resolve_tenant, subdomain_of};
pub use role::{RoleRecord, RoleScope};
pub use store::{
    InMemoryRecordStore, InMemoryRoleStore, InMemoryTenantDirectory, InMemoryUserStore,
    RecordStore, RoleStore, TenantDirectory, UserStore,
};
pub use tenant::{Subscription, SubscriptionStatus, Tenant, TenantLimits, Tier};
pub use user::UserRecord;
