//! Subscription and plan-limit gates.
//!
//! Both are pure decision functions; the caller supplies the tenant record
//! and, for the limit gate, the live count it just read from the store.

use serde::{Deserialize, Serialize};

use crate::error::AdmissionError;
use crate::tenant::Tenant;

/// Resources whose population is bounded by the tenant's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundedResource {
    Users,
    Products,
    Locations,
}

impl core::fmt::Display for BoundedResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            BoundedResource::Users => "users",
            BoundedResource::Products => "products",
            BoundedResource::Locations => "locations",
        };
        f.write_str(s)
    }
}

/// Reject tenant-scoped mutations unless the subscription admits writes.
pub fn ensure_subscription(tenant: &Tenant) -> Result<(), AdmissionError> {
    if tenant.subscription.status.admits_writes() {
        Ok(())
    } else {
        Err(AdmissionError::SubscriptionInactive)
    }
}

/// Admit a creation only while the live count is strictly below the ceiling.
///
/// `current` must be the authoritative count read from the store for this
/// request; callers must not pass a cached counter.
pub fn ensure_capacity(
    tenant: &Tenant,
    resource: BoundedResource,
    current: u64,
) -> Result<(), AdmissionError> {
    let ceiling = tenant.limits.ceiling(resource);
    if current >= u64::from(ceiling) {
        Err(AdmissionError::LimitExceeded {
            resource,
            current,
            ceiling,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::{SubscriptionStatus, Tenant, Tier};
    use chrono::Utc;

    fn tenant(status: SubscriptionStatus) -> Tenant {
        let mut t = Tenant::register("acme", "Acme", Tier::Starter, Utc::now()).unwrap();
        t.subscription.status = status;
        t
    }

    #[test]
    fn active_and_trial_pass_the_subscription_gate() {
        assert!(ensure_subscription(&tenant(SubscriptionStatus::Active)).is_ok());
        assert!(ensure_subscription(&tenant(SubscriptionStatus::Trial)).is_ok());
    }

    #[test]
    fn dormant_statuses_are_rejected() {
        for status in [
            SubscriptionStatus::Inactive,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Canceled,
        ] {
            assert_eq!(
                ensure_subscription(&tenant(status)).unwrap_err(),
                AdmissionError::SubscriptionInactive
            );
        }
    }

    #[test]
    fn capacity_margin_is_exact() {
        // Starter tier: max_locations = 3.
        let t = tenant(SubscriptionStatus::Active);

        assert!(ensure_capacity(&t, BoundedResource::Locations, 2).is_ok());
        assert_eq!(
            ensure_capacity(&t, BoundedResource::Locations, 3).unwrap_err(),
            AdmissionError::LimitExceeded {
                resource: BoundedResource::Locations,
                current: 3,
                ceiling: 3,
            }
        );
        // Past the ceiling (counts drifted) still rejects.
        assert!(ensure_capacity(&t, BoundedResource::Locations, 4).is_err());
    }
}
