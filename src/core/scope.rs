//! Acting scope: who is looking at the list and which tenants they may touch

use crate::core::query::QueryParams;
use crate::core::record::Record;
use serde::{Deserialize, Serialize};

/// Tenant-management boundary that partitions persisted keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagementScope {
    /// Acting user manages every tenant
    #[serde(rename = "all")]
    AllTenants,
    /// Acting user is confined to its own tenant
    #[serde(rename = "self")]
    OwnTenant,
}

impl ManagementScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagementScope::AllTenants => "all",
            ManagementScope::OwnTenant => "self",
        }
    }
}

/// Resolved scope handed in by the authentication collaborator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessScope {
    /// Stable identifier of the acting user (or tenant) namespacing persisted state
    pub subject_id: String,

    /// Tenant of the acting user
    pub tenant_id: Option<String>,

    pub can_manage_all_tenants: bool,

    /// False until the collaborator has finished resolving the fields above
    pub resolved: bool,
}

impl AccessScope {
    pub fn all_tenants(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            tenant_id: None,
            can_manage_all_tenants: true,
            resolved: true,
        }
    }

    pub fn own_tenant(subject_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            tenant_id: Some(tenant_id.into()),
            can_manage_all_tenants: false,
            resolved: true,
        }
    }

    /// Scope not yet known; the controller will not fetch or persist
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn management(&self) -> ManagementScope {
        if self.can_manage_all_tenants {
            ManagementScope::AllTenants
        } else {
            ManagementScope::OwnTenant
        }
    }

    /// Scope filters for the remote listing call
    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            tenant_id: if self.can_manage_all_tenants {
                None
            } else {
                self.tenant_id.clone()
            },
        }
    }

    /// Whether the acting scope may mutate `record`
    ///
    /// Records without a tenant are only reachable with all-tenant rights.
    pub fn permits<R: Record>(&self, record: &R) -> bool {
        if self.can_manage_all_tenants {
            return true;
        }
        match (record.tenant_id(), self.tenant_id.as_deref()) {
            (Some(owner), Some(acting)) => owner == acting,
            _ => false,
        }
    }
}

/// Composite storage keys: `prefix.kind.subject.scope`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    prefix: String,
}

impl StorageKey {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn preferences(&self, subject_id: &str, scope: ManagementScope) -> String {
        self.compose("prefs", subject_id, scope)
    }

    pub fn cache(&self, subject_id: &str, scope: ManagementScope) -> String {
        self.compose("cache", subject_id, scope)
    }

    fn compose(&self, kind: &str, subject_id: &str, scope: ManagementScope) -> String {
        format!("{}.{}.{}.{}", self.prefix, kind, subject_id, scope.as_str())
    }
}
