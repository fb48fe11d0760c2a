//! Tenant (company) record: subscription block, tier ceilings, lifecycle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use merx_core::{DomainError, DomainResult, TenantId};

use crate::gates::BoundedResource;

/// Subscription status, driven externally by billing events.
///
/// Transitions are plain enum writes; the only invariant the pipeline cares
/// about is [`SubscriptionStatus::admits_writes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    Inactive,
    Expired,
    Canceled,
}

impl SubscriptionStatus {
    /// Whether tenant-scoped mutations are admitted under this status.
    pub fn admits_writes(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trial)
    }
}

impl core::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// Subscription tier. Determines the default plan ceilings; stored ceilings
/// may be overridden per tenant by support staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Starter,
    Business,
    Enterprise,
}

impl Tier {
    pub fn default_limits(&self) -> TenantLimits {
        match self {
            Tier::Free => TenantLimits {
                max_users: 2,
                max_products: 25,
                max_locations: 1,
            },
            Tier::Starter => TenantLimits {
                max_users: 5,
                max_products: 250,
                max_locations: 3,
            },
            Tier::Business => TenantLimits {
                max_users: 25,
                max_products: 5_000,
                max_locations: 10,
            },
            Tier::Enterprise => TenantLimits {
                max_users: 500,
                max_products: 100_000,
                max_locations: 100,
            },
        }
    }
}

/// Static per-tenant resource ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantLimits {
    pub max_users: u32,
    pub max_products: u32,
    pub max_locations: u32,
}

impl TenantLimits {
    pub fn ceiling(&self, resource: BoundedResource) -> u32 {
        match resource {
            BoundedResource::Users => self.max_users,
            BoundedResource::Products => self.max_products,
            BoundedResource::Locations => self.max_locations,
        }
    }
}

/// Subscription block on a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl Subscription {
    /// Fourteen-day trial starting now, on the given tier.
    pub fn trial(tier: Tier, now: DateTime<Utc>) -> Self {
        Self {
            tier,
            status: SubscriptionStatus::Trial,
            period_start: now,
            period_end: now + Duration::days(14),
        }
    }
}

/// Tenant (company) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    /// Unique slug; doubles as the tenant's subdomain.
    pub slug: String,
    pub name: String,
    pub subscription: Subscription,
    pub limits: TenantLimits,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a tenant on a trial subscription with the tier's default
    /// ceilings. Validates the slug (lowercase alphanumeric plus hyphens,
    /// no leading/trailing hyphen).
    pub fn register(slug: &str, name: &str, tier: Tier, now: DateTime<Utc>) -> DomainResult<Self> {
        validate_slug(slug)?;
        if name.trim().is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }
        Ok(Self {
            id: TenantId::new(),
            slug: slug.to_string(),
            name: name.trim().to_string(),
            subscription: Subscription::trial(tier, now),
            limits: tier.default_limits(),
            active: true,
            created_at: now,
        })
    }
}

fn validate_slug(slug: &str) -> DomainResult<()> {
    let ok = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if ok {
        Ok(())
    } else {
        Err(DomainError::validation(
            "slug must be lowercase alphanumeric with interior hyphens",
        ))
    }
}
