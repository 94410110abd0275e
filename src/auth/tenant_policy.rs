// ABOUTME: Tenant allow-list policy for signed-in accounts
// ABOUTME: Exact, case-sensitive membership check with no normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

/// Tenant ids allowed to sign in, fixed for the life of the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedTenants(HashSet<String>);

impl AllowedTenants {
    /// Build the allow-list; order and duplicates are irrelevant
    pub fn new<I, S>(tenants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tenants.into_iter().map(Into::into).collect())
    }

    /// Exact membership, no trimming or case folding
    #[must_use]
    pub fn contains(&self, tenant_id: &str) -> bool {
        self.0.contains(tenant_id)
    }

    /// Number of distinct tenants
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no tenant can sign in
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decide whether a tenant may sign in. An absent tenant id is never allowed.
#[must_use]
pub fn is_allowed(tenant_id: Option<&str>, allow_list: &AllowedTenants) -> bool {
    tenant_id.is_some_and(|tid| allow_list.contains(tid))
}
