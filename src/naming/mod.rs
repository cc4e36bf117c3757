//! Naming Translator
//!
//! Pure mapping between domain identities and the registry's two-level
//! naming scheme: a Genericable becomes a group, a Fitable becomes a
//! service. The `"::"` separator is disallowed in identifiers by contract,
//! so the mapping is injective; nothing is ever parsed back out of a
//! service name - domain identities round-trip through instance metadata.

pub mod metadata;

use crate::schemas::{Fitable, Genericable};

/// Separator joining identity components into registry names
pub const SEPARATOR: &str = "::";

/// Metadata key holding the JSON-encoded Worker
pub const WORKER_KEY: &str = "worker";

/// Metadata key holding the JSON-encoded Application
pub const APPLICATION_KEY: &str = "application";

/// Metadata key holding the JSON-encoded FitableMeta
pub const FITABLE_META_KEY: &str = "fitable-meta";

/// Metadata key carrying the heartbeat interval in milliseconds
pub const HEARTBEAT_INTERVAL_KEY: &str = "preserved.heart.beat.interval";

/// Metadata key carrying the heartbeat timeout in milliseconds
pub const HEARTBEAT_TIMEOUT_KEY: &str = "preserved.heart.beat.timeout";

/// The registry service name of a Fitable
pub fn service_name(fitable: &Fitable) -> String {
    format!("{}{}{}", fitable.fitable_id, SEPARATOR, fitable.fitable_version)
}

/// The registry group name of a Fitable
pub fn group_name(fitable: &Fitable) -> String {
    format!(
        "{}{}{}",
        fitable.genericable_id, SEPARATOR, fitable.genericable_version
    )
}

/// The registry group name of a Genericable
pub fn genericable_group_name(genericable: &Genericable) -> String {
    format!(
        "{}{}{}",
        genericable.genericable_id, SEPARATOR, genericable.genericable_version
    )
}

/// The subscription-table key for a (group, service) pair
pub fn subscription_key(group: &str, service: &str) -> String {
    format!("{group}{SEPARATOR}{service}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_service_and_group_names() {
        let fitable = Fitable::new("g1", "1.0", "f1", "2.0");

        assert_eq!(service_name(&fitable), "f1::2.0");
        assert_eq!(group_name(&fitable), "g1::1.0");
    }

    #[test]
    fn test_genericable_group_name_matches_fitable_group() {
        let fitable = Fitable::new("g1", "1.0", "f1", "2.0");

        assert_eq!(
            genericable_group_name(&fitable.genericable()),
            group_name(&fitable)
        );
    }

    #[rstest]
    #[case(Fitable::new("g1", "1.0", "f1", "2.0"))]
    #[case(Fitable::new("modelengine.fit.demo", "1.0.0", "demo-impl", "1.0.0"))]
    #[case(Fitable::new("a", "b", "c", "d"))]
    fn test_names_contain_separator_exactly_once(#[case] fitable: Fitable) {
        assert_eq!(service_name(&fitable).matches(SEPARATOR).count(), 1);
        assert_eq!(group_name(&fitable).matches(SEPARATOR).count(), 1);
    }

    #[test]
    fn test_distinct_fitables_map_to_distinct_names() {
        let a = Fitable::new("g1", "1.0", "f1", "2.0");
        let b = Fitable::new("g1", "1.0", "f1", "2.1");
        let c = Fitable::new("g2", "1.0", "f1", "2.0");

        assert_ne!(
            (group_name(&a), service_name(&a)),
            (group_name(&b), service_name(&b))
        );
        assert_ne!(
            (group_name(&a), service_name(&a)),
            (group_name(&c), service_name(&c))
        );
    }

    #[test]
    fn test_subscription_key_joins_group_and_service() {
        assert_eq!(subscription_key("g1::1.0", "f1::2.0"), "g1::1.0::f1::2.0");
    }
}
