//! Tenant resolution: an explicit, ordered list of strategies.
//!
//! Precedence is subdomain → explicit header → sole membership. Each
//! strategy either names a tenant or abstains; the first to name one wins.
//! If none names one and the identity's memberships do not single a tenant
//! out, resolution fails with [`AdmissionError::AmbiguousTenant`] — the
//! resolver never guesses.

use merx_auth::UserKind;
use merx_core::TenantId;

use crate::error::AdmissionError;

/// Which strategy produced the tenant (kept for tracing and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    Subdomain,
    Header,
    SoleMembership,
}

/// Inputs to tenant resolution, already extracted from the request.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRequest<'a> {
    /// Tenant slug taken from the `Host` header, if the request came in on a
    /// tenant subdomain.
    pub subdomain: Option<&'a str>,
    /// Tenant id from the explicit `X-Company-Id` header, if present.
    pub header: Option<TenantId>,
    /// The identity's tenant memberships.
    pub memberships: &'a [TenantId],
}

/// Resolve exactly one tenant id, or fail.
///
/// `lookup_slug` maps a subdomain slug to a tenant id; an unknown slug is
/// `TenantNotFound` (the caller explicitly named a tenant that does not
/// exist — that is not ambiguity).
pub fn resolve_tenant(
    req: ResolutionRequest<'_>,
    lookup_slug: impl Fn(&str) -> Option<TenantId>,
) -> Result<(TenantId, ResolvedVia), AdmissionError> {
    if let Some(slug) = req.subdomain {
        return match lookup_slug(slug) {
            Some(id) => Ok((id, ResolvedVia::Subdomain)),
            None => Err(AdmissionError::TenantNotFound),
        };
    }

    if let Some(id) = req.header {
        return Ok((id, ResolvedVia::Header));
    }

    match req.memberships {
        [only] => Ok((*only, ResolvedVia::SoleMembership)),
        _ => Err(AdmissionError::AmbiguousTenant),
    }
}

/// Verify the identity may act within the resolved tenant.
///
/// System admins are exempt; everyone else must hold a membership.
pub fn ensure_member(
    kind: UserKind,
    memberships: &[TenantId],
    tenant_id: TenantId,
) -> Result<(), AdmissionError> {
    if kind == UserKind::SystemAdmin {
        return Ok(());
    }
    if memberships.contains(&tenant_id) {
        Ok(())
    } else {
        Err(AdmissionError::TenantForbidden)
    }
}

/// Extract the tenant slug from a `Host` header value, relative to the API
/// base domain. Returns `None` for the bare base domain, hosts outside the
/// base domain, and multi-label prefixes (fail closed).
pub fn subdomain_of(host: &str, base_domain: &str) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host);
    if host.eq_ignore_ascii_case(base_domain) {
        return None;
    }
    let prefix = host
        .strip_suffix(base_domain)
        .and_then(|p| p.strip_suffix('.'))?;
    if prefix.is_empty() || prefix.contains('.') {
        return None;
    }
    Some(prefix.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_lookup(_: &str) -> Option<TenantId> {
        None
    }

    #[test]
    fn subdomain_wins_over_header_and_memberships() {
        let a = TenantId::new();
        let b = TenantId::new();
        let req = ResolutionRequest {
            subdomain: Some("acme"),
            header: Some(b),
            memberships: &[b],
        };
        let (id, via) = resolve_tenant(req, |slug| (slug == "acme").then_some(a)).unwrap();
        assert_eq!(id, a);
        assert_eq!(via, ResolvedVia::Subdomain);
    }

    #[test]
    fn unknown_subdomain_is_not_found_not_ambiguous() {
        let req = ResolutionRequest {
            subdomain: Some("ghost"),
            header: None,
            memberships: &[TenantId::new()],
        };
        assert_eq!(
            resolve_tenant(req, no_lookup).unwrap_err(),
            AdmissionError::TenantNotFound
        );
    }

    #[test]
    fn header_wins_over_memberships() {
        let a = TenantId::new();
        let b = TenantId::new();
        let req = ResolutionRequest {
            subdomain: None,
            header: Some(a),
            memberships: &[b],
        };
        let (id, via) = resolve_tenant(req, no_lookup).unwrap();
        assert_eq!(id, a);
        assert_eq!(via, ResolvedVia::Header);
    }

    #[test]
    fn sole_membership_resolves_deterministically() {
        let a = TenantId::new();
        let req = ResolutionRequest {
            subdomain: None,
            header: None,
            memberships: &[a],
        };
        let (id, via) = resolve_tenant(req, no_lookup).unwrap();
        assert_eq!(id, a);
        assert_eq!(via, ResolvedVia::SoleMembership);
    }

    #[test]
    fn multiple_memberships_without_disambiguator_is_ambiguous() {
        let req = ResolutionRequest {
            subdomain: None,
            header: None,
            memberships: &[TenantId::new(), TenantId::new()],
        };
        assert_eq!(
            resolve_tenant(req, no_lookup).unwrap_err(),
            AdmissionError::AmbiguousTenant
        );
    }

    #[test]
    fn zero_memberships_is_ambiguous_too() {
        let req = ResolutionRequest {
            subdomain: None,
            header: None,
            memberships: &[],
        };
        assert_eq!(
            resolve_tenant(req, no_lookup).unwrap_err(),
            AdmissionError::AmbiguousTenant
        );
    }

    #[test]
    fn membership_check() {
        let a = TenantId::new();
        let b = TenantId::new();
        assert!(ensure_member(UserKind::CompanyUser, &[a], a).is_ok());
        assert_eq!(
            ensure_member(UserKind::CompanyUser, &[a], b).unwrap_err(),
            AdmissionError::TenantForbidden
        );
        // System admins bypass membership entirely.
        assert!(ensure_member(UserKind::SystemAdmin, &[], b).is_ok());
    }

    #[test]
    fn subdomain_extraction() {
        assert_eq!(subdomain_of("acme.merx.app", "merx.app").as_deref(), Some("acme"));
        assert_eq!(subdomain_of("ACME.merx.app:8080", "merx.app").as_deref(), Some("acme"));
        assert_eq!(subdomain_of("merx.app", "merx.app"), None);
        assert_eq!(subdomain_of("merx.app:443", "merx.app"), None);
        assert_eq!(subdomain_of("a.b.merx.app", "merx.app"), None);
        assert_eq!(subdomain_of("evilmerx.app", "merx.app"), None);
        assert_eq!(subdomain_of("other.example.com", "merx.app"), None);
    }
}
