//! Granted-authority strings and checks.
//!
//! Callers authenticate with a bearer token whose claims carry a list of
//! granted authorities (`ROLE_*` role names plus OAuth scopes such as
//! `SCOPE_openid`). Every endpoint declares the roles that may call it;
//! `SCOPE_openid` callers are first-party clients and pass any role gate,
//! while `ROLE_ADMIN` additionally bypasses per-record ownership checks.

use serde::{Deserialize, Serialize};

/// Well-known authority strings.
pub mod authorities {
    /// Administrators: pass every role gate and every ownership check.
    pub const ADMIN: &str = "ROLE_ADMIN";

    /// OpenID-scoped first-party clients: pass every role gate, but NOT
    /// ownership checks.
    pub const SCOPE_OPENID: &str = "SCOPE_openid";

    pub const TASK_READ: &str = "ROLE_TASK_READ";
    pub const TASK_CREATE: &str = "ROLE_TASK_CREATE";
    pub const TASK_SAVE: &str = "ROLE_TASK_SAVE";
    pub const TASK_DELETE: &str = "ROLE_TASK_DELETE";

    pub const PERSON_READ: &str = "ROLE_PERSON_READ";
    pub const PERSON_CREATE: &str = "ROLE_PERSON_CREATE";
    pub const PERSON_SAVE: &str = "ROLE_PERSON_SAVE";
    pub const PERSON_DELETE: &str = "ROLE_PERSON_DELETE";
}

/// A caller's granted authorities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authorities(Vec<String>);

impl Authorities {
    /// Wrap a list of granted-authority strings.
    #[must_use]
    pub const fn new(granted: Vec<String>) -> Self {
        Self(granted)
    }

    /// Whether the caller holds the given authority verbatim.
    #[must_use]
    pub fn has(&self, authority: &str) -> bool {
        self.0.iter().any(|a| a == authority)
    }

    /// Whether the caller holds `ROLE_ADMIN`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has(authorities::ADMIN)
    }

    /// Role gate: admin, any of `roles`, or the `SCOPE_openid` bypass.
    ///
    /// This is the access rule every endpoint applies before its own
    /// ownership logic.
    #[must_use]
    pub fn any_role_or_openid(&self, roles: &[&str]) -> bool {
        self.is_admin()
            || self.has(authorities::SCOPE_OPENID)
            || roles.iter().any(|r| self.has(r))
    }

    /// The raw granted-authority strings.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Authorities {
    fn from(granted: Vec<String>) -> Self {
        Self(granted)
    }
}

impl FromIterator<String> for Authorities {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(list: &[&str]) -> Authorities {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_admin_passes_any_gate() {
        let auth = granted(&[authorities::ADMIN]);
        assert!(auth.is_admin());
        assert!(auth.any_role_or_openid(&[authorities::TASK_READ]));
        assert!(auth.any_role_or_openid(&[]));
    }

    #[test]
    fn test_openid_scope_passes_role_gate_but_is_not_admin() {
        let auth = granted(&[authorities::SCOPE_OPENID]);
        assert!(auth.any_role_or_openid(&[authorities::TASK_DELETE]));
        assert!(!auth.is_admin());
    }

    #[test]
    fn test_matching_role_passes_gate() {
        let auth = granted(&[authorities::TASK_READ]);
        assert!(auth.any_role_or_openid(&[authorities::TASK_READ, authorities::TASK_SAVE]));
    }

    #[test]
    fn test_unrelated_role_is_rejected() {
        // A bare authority without the ROLE_ prefix must not match either.
        let auth = granted(&["TASK_DELETE"]);
        assert!(!auth.any_role_or_openid(&[authorities::TASK_DELETE]));

        let auth = granted(&[authorities::PERSON_READ]);
        assert!(!auth.any_role_or_openid(&[authorities::TASK_READ]));
    }
}
