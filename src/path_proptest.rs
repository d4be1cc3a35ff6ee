//! Property-based tests for path relativization.
//!
//! These tests use proptest to generate random directory layouts and verify
//! that the link targets computed for overlay symlinks always resolve back to
//! the entry they were computed for.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{normalize_lexically, relative_link_target, resolve_link_target};
    use proptest::prelude::*;
    use std::path::{Component, PathBuf};

    fn absolute(parts: &[String]) -> PathBuf {
        let mut path = PathBuf::from("/");
        for part in parts {
            path.push(part);
        }
        path
    }

    fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-zA-Z0-9_]{1,6}", 0..6)
    }

    proptest! {
        /// Property: a computed target resolves back to the original entry
        #[test]
        fn relative_target_round_trips(link in segments(), target in segments()) {
            let link_dir = absolute(&link);
            let target = absolute(&target);

            let stored = relative_link_target(&link_dir, &target);
            prop_assert_eq!(
                resolve_link_target(&link_dir, &stored),
                normalize_lexically(&target)
            );
        }

        /// Property: computed targets are always relative
        #[test]
        fn relative_target_is_relative(link in segments(), target in segments()) {
            let stored = relative_link_target(&absolute(&link), &absolute(&target));
            prop_assert!(stored.is_relative(), "got absolute target {:?}", stored);
        }

        /// Property: parent hops only ever appear as a leading run
        #[test]
        fn parent_hops_are_leading(link in segments(), target in segments()) {
            let stored = relative_link_target(&absolute(&link), &absolute(&target));
            let mut seen_normal = false;
            for component in stored.components() {
                match component {
                    Component::ParentDir => prop_assert!(!seen_normal),
                    Component::Normal(_) => seen_normal = true,
                    _ => {}
                }
            }
        }

        /// Property: shared prefixes do not change the result
        #[test]
        fn shared_prefix_is_irrelevant(
            prefix in segments(),
            link in segments(),
            target in segments(),
        ) {
            let bare = relative_link_target(&absolute(&link), &absolute(&target));

            let mut prefixed_link = prefix.clone();
            prefixed_link.extend(link.iter().cloned());
            let mut prefixed_target = prefix;
            prefixed_target.extend(target.iter().cloned());
            let prefixed = relative_link_target(
                &absolute(&prefixed_link),
                &absolute(&prefixed_target),
            );

            prop_assert_eq!(bare, prefixed);
        }

        /// Property: normalization is idempotent
        #[test]
        fn normalize_is_idempotent(parts in prop::collection::vec("(\\.\\.|\\.|[a-z]{1,4})", 0..8)) {
            let raw: PathBuf = parts.iter().collect();
            let once = normalize_lexically(&raw);
            let twice = normalize_lexically(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
