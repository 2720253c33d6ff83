use serde::Serialize;

use crate::Permission;

/// Access control gate.
///
/// Returns true iff `required` is one of `granted` (exact string match).
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(granted: &[Permission], required: &Permission) -> bool {
    granted.iter().any(|p| p == required)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Explanation of an authorization decision, for "why was I denied?" debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    /// The permission that was being checked.
    pub required_permission: String,

    /// Whether the authorization was granted.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Permissions carried by the token (sorted, deduplicated).
    pub effective_permissions: Vec<String>,

    /// Granted permissions that differ from the required one only by case or
    /// surrounding whitespace. These never match, but are the usual culprit.
    pub near_misses: Vec<String>,
}

/// Explain why [`authorize`] allows or denies `required` for `granted`.
pub fn explain_authorization(granted: &[Permission], required: &Permission) -> AuthorizationExplanation {
    let required_str = required.as_str();

    let mut effective: Vec<String> = granted.iter().map(|p| p.as_str().to_string()).collect();
    effective.sort();
    effective.dedup();

    let allowed = authorize(granted, required);

    let near_misses: Vec<String> = if allowed {
        Vec::new()
    } else {
        let wanted = required_str.trim().to_lowercase();
        effective
            .iter()
            .filter(|p| p.trim().to_lowercase() == wanted)
            .cloned()
            .collect()
    };

    let reason = if allowed {
        format!("token carries permission '{required_str}'")
    } else if near_misses.is_empty() {
        format!("token does not carry permission '{required_str}'")
    } else {
        format!(
            "token does not carry permission '{required_str}' (matching is exact and case-sensitive; found {:?})",
            near_misses
        )
    };

    AuthorizationExplanation {
        required_permission: required_str.to_string(),
        granted: allowed,
        reason,
        effective_permissions: effective,
        near_misses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn perms(names: &[&'static str]) -> Vec<Permission> {
        names.iter().map(|n| Permission::new(*n)).collect()
    }

    #[test]
    fn exact_match_is_granted() {
        let granted = perms(&["get orders", "delete order"]);
        assert!(authorize(&granted, &Permission::new("delete order")));
    }

    #[test]
    fn missing_permission_is_denied() {
        let granted = perms(&["get orders"]);
        assert!(!authorize(&granted, &Permission::new("create orders")));
    }

    #[test]
    fn empty_grant_denies_everything() {
        assert!(!authorize(&[], &Permission::new("get orders")));
    }

    #[test]
    fn no_wildcard_semantics() {
        let granted = perms(&["*", "get"]);
        assert!(!authorize(&granted, &Permission::new("get orders")));
    }

    #[test]
    fn match_is_case_sensitive() {
        let granted = perms(&["Get Orders"]);
        assert!(!authorize(&granted, &Permission::new("get orders")));
    }

    #[test]
    fn explanation_reports_near_misses() {
        let granted = perms(&["Get Orders ", "get stocks"]);
        let explanation = explain_authorization(&granted, &Permission::new("get orders"));

        assert!(!explanation.granted);
        assert_eq!(explanation.near_misses, vec!["Get Orders ".to_string()]);
        assert_eq!(explanation.effective_permissions.len(), 2);
    }

    #[test]
    fn explanation_for_granted_request() {
        let granted = perms(&["get orders", "get orders"]);
        let explanation = explain_authorization(&granted, &Permission::new("get orders"));

        assert!(explanation.granted);
        assert!(explanation.near_misses.is_empty());
        assert_eq!(explanation.effective_permissions, vec!["get orders".to_string()]);
    }

    proptest! {
        #[test]
        fn authorize_is_membership(
            granted in proptest::collection::vec("[a-z ]{0,12}", 0..8),
            required in "[a-z ]{0,12}",
        ) {
            let granted: Vec<Permission> = granted.into_iter().map(Permission::from).collect();
            let required = Permission::from(required);
            let expected = granted.iter().any(|p| p.as_str() == required.as_str());
            prop_assert_eq!(authorize(&granted, &required), expected);
        }

        #[test]
        fn granted_permission_always_authorizes(
            granted in proptest::collection::vec("[a-z ]{1,12}", 1..8),
            pick in 0usize..8,
        ) {
            let required = granted[pick % granted.len()].clone();
            let granted: Vec<Permission> = granted.into_iter().rev().map(Permission::from).collect();
            prop_assert!(authorize(&granted, &Permission::from(required)));
        }
    }
}
