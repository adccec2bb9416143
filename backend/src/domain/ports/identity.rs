//! Port abstraction for the identity collaborator.
//!
//! The authorization stage consults this port to answer the three questions
//! declarative access requirements can ask: is anyone authenticated, does the
//! caller hold a role, and does the caller satisfy a policy.

use async_trait::async_trait;

/// Identity and role lookup for the request's caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Identity: Send + Sync {
    /// Whether a user is currently authenticated.
    async fn authenticated(&self) -> bool;

    /// Whether the current user holds the given role.
    async fn has_role(&self, role: &str) -> bool;

    /// Whether the current user satisfies the given policy.
    async fn satisfies_policy(&self, policy: &str) -> bool;
}

/// Identity fixture answering from static membership lists.
///
/// Useful in tests and in wirings whose commands declare no access
/// requirements.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentity {
    authenticated: bool,
    roles: Vec<String>,
    policies: Vec<String>,
}

impl StaticIdentity {
    /// An unauthenticated caller with no roles or policies.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated caller with no roles or policies yet.
    pub fn signed_in() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    /// Grant the caller the given roles.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Grant the caller the given policies.
    pub fn with_policies<I, S>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies = policies.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl Identity for StaticIdentity {
    async fn authenticated(&self) -> bool {
        self.authenticated
    }

    async fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }

    async fn satisfies_policy(&self, policy: &str) -> bool {
        self.policies.iter().any(|held| held == policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anonymous_answers_no_to_everything() {
        let identity = StaticIdentity::anonymous();
        assert!(!identity.authenticated().await);
        assert!(!identity.has_role("admin").await);
        assert!(!identity.satisfies_policy("can_remove_users").await);
    }

    #[tokio::test]
    async fn signed_in_caller_reports_granted_memberships() {
        let identity = StaticIdentity::signed_in()
            .with_roles(["admin"])
            .with_policies(["can_remove_users"]);
        assert!(identity.authenticated().await);
        assert!(identity.has_role("admin").await);
        assert!(!identity.has_role("auditor").await);
        assert!(identity.satisfies_policy("can_remove_users").await);
    }
}
