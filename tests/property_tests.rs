//! Property-based tests for specdrive
//!
//! These tests use proptest to check the summary wording and file discovery over many
//! generated inputs.

use proptest::prelude::*;

// =============================================================================
// Summary Properties
// =============================================================================

mod summary_tests {
    use super::*;
    use specdrive::format_summary;

    fn noun(count: usize, singular: &str) -> String {
        if count == 1 {
            format!("1 {}", singular)
        } else {
            format!("{} {}s", count, singular)
        }
    }

    proptest! {
        #[test]
        fn nouns_are_singular_only_for_one(suites in 0usize..5, assertions in 0usize..5, failures in 0usize..5) {
            let summary = format_summary(suites, assertions, failures);
            let expected = format!(
                "{}, {}, {}\n",
                noun(suites, "test"),
                noun(assertions, "assertion"),
                noun(failures, "failure"),
            );
            prop_assert_eq!(summary, expected);
        }

        #[test]
        fn summary_is_a_single_line(suites in any::<usize>(), assertions in any::<usize>(), failures in any::<usize>()) {
            let summary = format_summary(suites, assertions, failures);
            prop_assert!(summary.ends_with('\n'));
            prop_assert_eq!(summary.matches('\n').count(), 1);
        }
    }
}

// =============================================================================
// Discovery Properties
// =============================================================================

mod discovery_tests {
    use super::*;
    use specdrive::{SpecPatterns, scan};
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Relative file paths up to three directories deep.
    fn tree_strategy() -> impl Strategy<Value = BTreeSet<String>> {
        let segment = "[a-z]{1,6}";
        let file = prop_oneof![
            "[a-z]{1,6}Spec\\.bdd",
            "[a-z]{1,6}_spec\\.bdd",
            "[a-z]{1,6}\\.bdd",
            "[a-z]{1,6}\\.txt",
        ];
        let path = (prop::collection::vec(segment, 0..3), file).prop_map(|(mut dirs, file)| {
            dirs.push(file);
            dirs.join("/")
        });
        prop::collection::btree_set(path, 0..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn scan_finds_exactly_the_matching_files(files in tree_strategy()) {
            let dir = TempDir::new().unwrap();
            let mut created = BTreeSet::new();
            for rel in &files {
                let path = dir.path().join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, "").unwrap();
                created.insert(path);
            }

            let patterns = SpecPatterns::from_extensions(&["bdd".to_string()]).unwrap();
            let found = scan(&[dir.path().to_path_buf()], &patterns.spec).unwrap();

            let expected: BTreeSet<PathBuf> = created
                .iter()
                .filter(|p| patterns.spec.is_match(&p.to_string_lossy()))
                .cloned()
                .collect();
            let found_set: BTreeSet<PathBuf> = found.iter().cloned().collect();
            prop_assert_eq!(found.len(), found_set.len());
            prop_assert_eq!(found_set, expected);
            prop_assert!(found.iter().all(|p| p.is_file()));
        }
    }
}
